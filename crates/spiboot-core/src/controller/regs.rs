//! Allwinner SPI controller register definitions
//!
//! Register offsets and bit definitions for the two SPI controller
//! generations found on Allwinner SoCs.
//!
//! # Register Layout by Generation
//!
//! - sun4i (A10/A13/A20): control, FIFO and counters packed in the first
//!   0x30 bytes, start bit in the control register
//! - sun6i (A31 and everything later): separate global and transfer control
//!   registers, FIFOs moved to 0x200/0x300, extra burst control register

use bitflags::bitflags;

// ============================================================================
// sun4i Register Definitions
// ============================================================================

/// sun4i RX data register
pub const SUN4I_REG_RX: usize = 0x00;
/// sun4i TX data register
pub const SUN4I_REG_TX: usize = 0x04;
/// sun4i control register
pub const SUN4I_REG_CTL: usize = 0x08;
/// sun4i clock control register
pub const SUN4I_REG_CCTL: usize = 0x1C;
/// sun4i burst counter (total bytes)
pub const SUN4I_REG_BC: usize = 0x20;
/// sun4i transfer counter (bytes to send)
pub const SUN4I_REG_TC: usize = 0x24;
/// sun4i FIFO status register
pub const SUN4I_REG_FIFO_STA: usize = 0x28;

bitflags! {
    /// sun4i CTL register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sun4iCtl: u32 {
        /// Controller enable
        const ENABLE = 1 << 0;
        /// Master mode
        const MASTER = 1 << 1;
        /// TX FIFO reset
        const TF_RST = 1 << 8;
        /// RX FIFO reset
        const RF_RST = 1 << 9;
        /// Start the exchange
        const XCH = 1 << 10;
    }
}

// ============================================================================
// sun6i Register Definitions
// ============================================================================

/// sun6i global control register
pub const SUN6I_REG_GCR: usize = 0x04;
/// sun6i transfer control register
pub const SUN6I_REG_TCR: usize = 0x08;
/// sun6i FIFO status register
pub const SUN6I_REG_FIFO_STA: usize = 0x1C;
/// sun6i clock control register
pub const SUN6I_REG_CCTL: usize = 0x24;
/// sun6i master burst counter (total bytes)
pub const SUN6I_REG_MBC: usize = 0x30;
/// sun6i master transmit counter (bytes to send)
pub const SUN6I_REG_MTC: usize = 0x34;
/// sun6i burst control counter (single-mode transmit count)
pub const SUN6I_REG_BCC: usize = 0x38;
/// sun6i TX data register
pub const SUN6I_REG_TXD: usize = 0x200;
/// sun6i RX data register
pub const SUN6I_REG_RXD: usize = 0x300;

bitflags! {
    /// sun6i GCR register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sun6iGcr: u32 {
        /// Controller enable
        const ENABLE = 1 << 0;
        /// Master mode
        const MASTER = 1 << 1;
        /// Soft reset, cleared by hardware when done
        const SRST = 1 << 31;
    }
}

bitflags! {
    /// sun6i TCR register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Sun6iTcr: u32 {
        /// Start the exchange
        const XCH = 1 << 31;
    }
}

// ============================================================================
// FIFO status (both generations)
// ============================================================================

/// Number of bytes waiting in the RX FIFO
pub const FIFO_STA_RX_CNT: u32 = 0x7F;
/// Number of bytes waiting in the TX FIFO
pub const FIFO_STA_TX_CNT: u32 = 0x7F << 16;
/// Shift of the TX FIFO count
pub const FIFO_STA_TX_CNT_SHIFT: u32 = 16;

/// Hardware FIFO depth in bytes
pub const FIFO_DEPTH: usize = 64;

// ============================================================================
// Clock divider
// ============================================================================

/// No divider
pub const SPI0_CLK_DIV_NONE: u32 = 0x0000;
/// Divide by 2
pub const SPI0_CLK_DIV_BY_2: u32 = 0x1000;
/// Divide by 4: 6 MHz from OSC24M, what the boot ROM uses
pub const SPI0_CLK_DIV_BY_4: u32 = 0x1001;
/// Divide by 32
pub const SPI0_CLK_DIV_BY_32: u32 = 0x100f;
