//! Error types for spiboot-core
//!
//! This module provides a no_std compatible error type that the loader
//! propagates to the boot-device dispatcher.
//!
//! A controller that never reaches the state the driver polls for is not
//! represented here. Every hardware wait is an unbounded spin, so such a
//! fault shows up as a hang of the boot attempt, which is the accepted
//! failure mode at this stage of boot.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Chip errors
    /// The identifier read back as all zeros: nothing is attached to SPI0
    NoChipDetected,
    /// A device answered but it is not in the registry and the generic
    /// fallback is disabled
    UnsupportedChip {
        /// The 24-bit identifier read from the device
        jedec_id: u32,
    },

    // Image errors
    /// The boot image header failed checksum validation
    ChecksumInvalid,
    /// The boot image header could not be parsed
    ImageParseError,
    /// The FIT loader rejected the container
    FitLoadFailed,

    // Memory errors
    /// The destination window cannot hold the requested range
    AddressOutOfRange,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChipDetected => write!(f, "no SPI flash device attached"),
            Self::UnsupportedChip { jedec_id } => {
                write!(f, "unsupported chip {:06x}", jedec_id)
            }
            Self::ChecksumInvalid => write!(f, "image header CRC error"),
            Self::ImageParseError => write!(f, "image header could not be parsed"),
            Self::FitLoadFailed => write!(f, "FIT image could not be loaded"),
            Self::AddressOutOfRange => write!(f, "destination address out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
