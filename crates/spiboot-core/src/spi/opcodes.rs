//! SPI flash opcodes used by the boot loader
//!
//! Only the read path is implemented, so this is the complete command set
//! the loader ever puts on the wire.

// ============================================================================
// Identification
// ============================================================================

/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;

// ============================================================================
// SPI NOR
// ============================================================================

/// Read Data with 3-byte address, no dummy cycles
pub const READ: u8 = 0x03;

// ============================================================================
// SPI NAND
// ============================================================================

/// Page Read: move one page from the array into the on-chip cache
pub const PAGE_READ: u8 = 0x13;
/// Read From Cache with 2-byte column address and one dummy byte
pub const READ_FROM_CACHE: u8 = 0x0B;
/// Get Feature
pub const GET_FEATURE: u8 = 0x0F;
/// Feature address of the status register
pub const FEATURE_STATUS: u8 = 0xC0;

/// Status register: operation in progress
pub const STATUS_OIP: u8 = 0x01;

/// Value clocked out during dummy cycles
pub const DUMMY_BYTE: u8 = 0x00;
