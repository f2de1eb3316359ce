//! Minimal sunxi port-controller support
//!
//! Only pin function selection is needed to route SPI0 to its pads. Each
//! bank has four configuration registers holding a 4-bit function field
//! per pin, eight pins per register.

use crate::transport::RegisterBus;

/// Bank index of port C
pub const SUNXI_GPIO_C: u8 = 2;

/// A single GPIO pin: bank and index within the bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioPin {
    /// Bank (0 = PA, 1 = PB, 2 = PC, ...)
    pub bank: u8,
    /// Pin within the bank
    pub index: u8,
}

impl GpioPin {
    /// Pin `index` of port C
    pub const fn pc(index: u8) -> Self {
        Self {
            bank: SUNXI_GPIO_C,
            index,
        }
    }
}

impl core::fmt::Display for GpioPin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "P{}{}", (b'A' + self.bank) as char, self.index)
    }
}

/// Port controller base and bank spacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PioLayout {
    /// Port controller base address
    pub base: usize,
    /// Distance between two banks
    pub bank_stride: usize,
}

impl PioLayout {
    /// Create a layout
    pub const fn new(base: usize, bank_stride: usize) -> Self {
        Self { base, bank_stride }
    }

    /// Configuration register address and bit shift for `pin`
    pub const fn cfg_location(&self, pin: GpioPin) -> (usize, u32) {
        let reg = self.base
            + pin.bank as usize * self.bank_stride
            + (pin.index as usize / 8) * 4;
        let shift = (pin.index as u32 % 8) * 4;
        (reg, shift)
    }
}

/// Set the function of `pin`, leaving the other pins of the register alone
pub fn set_cfgpin<B: RegisterBus + ?Sized>(bus: &mut B, pio: &PioLayout, pin: GpioPin, function: u8) {
    let (reg, shift) = pio.cfg_location(pin);
    let mut val = bus.read32(reg);
    val &= !(0xF << shift);
    val |= ((function & 0xF) as u32) << shift;
    bus.write32(reg, val);
}

/// Read back the function of `pin`
pub fn get_cfgpin<B: RegisterBus + ?Sized>(bus: &mut B, pio: &PioLayout, pin: GpioPin) -> u8 {
    let (reg, shift) = pio.cfg_location(pin);
    ((bus.read32(reg) >> shift) & 0xF) as u8
}
