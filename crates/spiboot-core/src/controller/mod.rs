//! SPI controller generations
//!
//! The loader drives two incompatible register layouts through one code
//! path. Instead of branching on the SoC at every register access, the
//! generation is captured once in a [`ControllerVariant`] and its
//! [`RegisterLayout`] is handed to the protocol engine.

pub mod regs;

use regs::*;

/// SPI controller generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerVariant {
    /// sun4i-style controller (A10, A13, A20)
    GenA,
    /// sun6i-style controller (A31 and later)
    GenB,
}

/// Register offsets and start bit of one controller generation
///
/// All offsets are relative to the SPI0 base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLayout {
    /// Register holding the enable/master bits
    pub global_ctl: usize,
    /// Register holding the start-transfer bit
    pub xfer_ctl: usize,
    /// Start-transfer bit in `xfer_ctl`
    pub xch_bit: u32,
    /// FIFO status register
    pub fifo_status: usize,
    /// TX data register
    pub tx: usize,
    /// RX data register
    pub rx: usize,
    /// Burst counter: total bytes of the exchange
    pub burst_count: usize,
    /// Transfer counter: bytes sent by the master
    pub transfer_count: usize,
    /// Secondary burst counter, sun6i only
    pub burst_control: Option<usize>,
    /// Clock control register
    pub clock_ctl: usize,
}

const GEN_A_LAYOUT: RegisterLayout = RegisterLayout {
    global_ctl: SUN4I_REG_CTL,
    xfer_ctl: SUN4I_REG_CTL,
    xch_bit: Sun4iCtl::XCH.bits(),
    fifo_status: SUN4I_REG_FIFO_STA,
    tx: SUN4I_REG_TX,
    rx: SUN4I_REG_RX,
    burst_count: SUN4I_REG_BC,
    transfer_count: SUN4I_REG_TC,
    burst_control: None,
    clock_ctl: SUN4I_REG_CCTL,
};

const GEN_B_LAYOUT: RegisterLayout = RegisterLayout {
    global_ctl: SUN6I_REG_GCR,
    xfer_ctl: SUN6I_REG_TCR,
    xch_bit: Sun6iTcr::XCH.bits(),
    fifo_status: SUN6I_REG_FIFO_STA,
    tx: SUN6I_REG_TXD,
    rx: SUN6I_REG_RXD,
    burst_count: SUN6I_REG_MBC,
    transfer_count: SUN6I_REG_MTC,
    burst_control: Some(SUN6I_REG_BCC),
    clock_ctl: SUN6I_REG_CCTL,
};

impl ControllerVariant {
    /// Register layout of this generation
    pub const fn layout(&self) -> &'static RegisterLayout {
        match self {
            Self::GenA => &GEN_A_LAYOUT,
            Self::GenB => &GEN_B_LAYOUT,
        }
    }

    /// True for the sun6i-style controller
    pub const fn is_gen_b(&self) -> bool {
        matches!(self, Self::GenB)
    }

    /// Bits set in `global_ctl` to bring the controller up
    ///
    /// sun6i also requests a soft reset which the hardware acknowledges by
    /// clearing [`Sun6iGcr::SRST`]; sun4i resets both FIFOs instead.
    pub const fn enable_bits(&self) -> u32 {
        match self {
            Self::GenA => Sun4iCtl::MASTER
                .union(Sun4iCtl::ENABLE)
                .union(Sun4iCtl::TF_RST)
                .union(Sun4iCtl::RF_RST)
                .bits(),
            Self::GenB => Sun6iGcr::MASTER
                .union(Sun6iGcr::ENABLE)
                .union(Sun6iGcr::SRST)
                .bits(),
        }
    }

    /// Bits cleared in `global_ctl` to take the controller down
    pub const fn disable_bits(&self) -> u32 {
        match self {
            Self::GenA => Sun4iCtl::MASTER.union(Sun4iCtl::ENABLE).bits(),
            Self::GenB => Sun6iGcr::MASTER.union(Sun6iGcr::ENABLE).bits(),
        }
    }

    /// Soft-reset busy bit the driver waits on, if this generation has one
    pub const fn reset_busy_bit(&self) -> Option<u32> {
        match self {
            Self::GenA => None,
            Self::GenB => Some(Sun6iGcr::SRST.bits()),
        }
    }
}

impl core::fmt::Display for ControllerVariant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GenA => write!(f, "sun4i"),
            Self::GenB => write!(f, "sun6i"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_a_offsets() {
        let l = ControllerVariant::GenA.layout();
        assert_eq!(l.xfer_ctl, 0x08);
        assert_eq!(l.rx, 0x00);
        assert_eq!(l.tx, 0x04);
        assert_eq!(l.fifo_status, 0x28);
        assert_eq!(l.burst_count, 0x20);
        assert_eq!(l.transfer_count, 0x24);
        assert_eq!(l.burst_control, None);
        assert_eq!(l.xch_bit, 1 << 10);
    }

    #[test]
    fn test_gen_b_offsets() {
        let l = ControllerVariant::GenB.layout();
        assert_eq!(l.global_ctl, 0x04);
        assert_eq!(l.xfer_ctl, 0x08);
        assert_eq!(l.fifo_status, 0x1C);
        assert_eq!(l.burst_count, 0x30);
        assert_eq!(l.transfer_count, 0x34);
        assert_eq!(l.burst_control, Some(0x38));
        assert_eq!(l.tx, 0x200);
        assert_eq!(l.rx, 0x300);
        assert_eq!(l.xch_bit, 1 << 31);
    }

    #[test]
    fn test_enable_bits() {
        assert_eq!(ControllerVariant::GenA.enable_bits(), 0x303);
        assert_eq!(ControllerVariant::GenB.enable_bits(), 0x8000_0003);
        assert_eq!(ControllerVariant::GenB.reset_busy_bit(), Some(1 << 31));
        assert_eq!(ControllerVariant::GenA.reset_busy_bit(), None);
    }
}
