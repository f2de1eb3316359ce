//! spiboot-core - Raw SPI flash boot-stage loader
//!
//! This crate loads the next boot stage (a legacy image or a FIT container)
//! from SPI NOR or SPI NAND flash attached to the SPI0 controller of an
//! Allwinner SoC. It runs before DRAM allocators, interrupts or any OS
//! service exist, so it is `no_std`, never allocates, and waits on hardware
//! by spinning on status registers.
//!
//! # Layers
//!
//! - [`transport`] - SPI0 pin mux, clock gating and controller enable
//! - [`protocol`] - the single command/response `exchange` primitive
//! - [`chip`] - SPI NAND geometry registry
//! - [`reader`] - FIFO-sized chunking and the NAND page-cache state machine
//! - [`loader`] - header validation and image streaming
//!
//! # Features
//!
//! - `std` - Implement `std::error::Error` for [`Error`]
//!
//! # Example
//!
//! ```ignore
//! use spiboot_core::image::LegacyImage;
//! use spiboot_core::loader::{BootConfig, BootLoader, NoFit, PhysicalMemory};
//! use spiboot_core::target::SocTarget;
//! use spiboot_core::transport::Mmio;
//!
//! let bus = unsafe { Mmio::new() };
//! let mut memory = unsafe { PhysicalMemory::new() };
//! let config = BootConfig::nand(spl_size, 0x40000);
//! let loader = BootLoader::new(SocTarget::Sun8iT113.descriptor(), config);
//! let info = loader.load(bus, delay, &LegacyImage, &mut NoFit, &mut memory)?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod chip;
pub mod controller;
pub mod error;
pub mod gpio;
pub mod image;
pub mod loader;
pub mod protocol;
pub mod reader;
pub mod spi;
pub mod target;
pub mod transport;

pub use error::{Error, Result};
