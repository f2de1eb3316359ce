//! spiboot - Host-side runner for the sunxi SPI flash boot loader
//!
//! The loader in `spiboot-core` runs on the SoC straight out of the Boot
//! ROM. This crate runs the same code on a development machine against the
//! register-level simulator in `spiboot-sim`, with a flash image file
//! behind the simulated SPI0 controller. It is useful to check that a
//! flash layout boots before writing it to a board, and to see the exact
//! SPI traffic the loader produces (`-vv`).

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
