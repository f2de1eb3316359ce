//! Flash geometry and the SPI NAND registry
//!
//! SPI NOR needs no table: every part accepts Read Data (03h) with a
//! 3-byte address. SPI NAND parts are looked up by their identifier.

mod registry;
mod types;

pub use registry::*;
pub use types::*;
