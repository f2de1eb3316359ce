//! SPI frame types and opcodes
//!
//! This module provides the fixed-shape command frame the protocol engine
//! sends, the address widths it supports, and the flash opcodes the loader
//! needs.

mod address;
mod frame;
pub mod opcodes;

pub use address::AddressWidth;
pub use frame::{CommandFrame, MAX_HEADER_LEN};
pub use opcodes::*;
