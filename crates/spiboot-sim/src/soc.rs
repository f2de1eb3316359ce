//! Simulated SoC register space
//!
//! Addresses inside the SPI0 window go to the [`Spi0Model`]; everything
//! else (CCU, port controller) is plain storage.

use std::collections::HashMap;

use spiboot_core::gpio::{GpioPin, PioLayout};
use spiboot_core::target::{TargetDescriptor, SPI0_MODULE_CLK_EN};
use spiboot_core::transport::RegisterBus;

use crate::flash::SimFlash;
use crate::spi0::Spi0Model;

/// Size of the SPI0 register window
pub const SPI0_WINDOW: usize = 0x1000;

/// Simulated SoC: SPI0, its clocks and its pins
#[derive(Debug)]
pub struct SimSoc {
    target: TargetDescriptor,
    spi0: Spi0Model,
    regs: HashMap<usize, u32>,
}

impl SimSoc {
    /// Create a SoC with `flash` wired to SPI0
    pub fn new(target: TargetDescriptor, flash: SimFlash) -> Self {
        Self {
            spi0: Spi0Model::new(target.variant, flash),
            target,
            regs: HashMap::new(),
        }
    }

    /// Target being simulated
    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    /// SPI0 controller model
    pub fn spi0(&self) -> &Spi0Model {
        &self.spi0
    }

    /// Flash on SPI0
    pub fn flash(&self) -> &SimFlash {
        self.spi0.flash()
    }

    /// Number of times SPI0 was shut down
    pub fn teardown_count(&self) -> usize {
        self.spi0.disable_count()
    }

    /// Current function of `pin`
    pub fn pin_function(&self, pin: GpioPin) -> u8 {
        let pio: PioLayout = self.target.pio;
        let (reg, shift) = pio.cfg_location(pin);
        ((self.reg(reg) >> shift) & 0xF) as u8
    }

    /// True if every SPI0 pin is set to `function`
    pub fn pins_set_to(&self, function: u8) -> bool {
        self.target
            .pins
            .iter()
            .all(|&pin| self.pin_function(pin) == function)
    }

    /// True while reset, gate and module clock all let SPI0 run
    pub fn clock_running(&self) -> bool {
        let clocks = self.target.clocks;
        let reset_ok = clocks
            .reset
            .map_or(true, |r| self.reg(r.addr) & r.bits == r.bits);
        let gate_ok = clocks
            .gate
            .map_or(true, |g| self.reg(g.addr) & g.bits == g.bits);
        let module_ok = clocks
            .module_clock
            .map_or(true, |m| self.reg(m) & SPI0_MODULE_CLK_EN != 0);
        reset_ok && gate_ok && module_ok
    }

    fn reg(&self, addr: usize) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    fn spi0_offset(&self, addr: usize) -> Option<usize> {
        let base = self.target.spi0_base;
        (addr >= base && addr < base + SPI0_WINDOW).then(|| addr - base)
    }

    fn sync_clock(&mut self) {
        let running = self.clock_running();
        self.spi0.set_clocked(running);
    }
}

impl RegisterBus for SimSoc {
    fn read32(&mut self, addr: usize) -> u32 {
        match self.spi0_offset(addr) {
            Some(offset) => self.spi0.read32(offset),
            None => self.reg(addr),
        }
    }

    fn write32(&mut self, addr: usize, value: u32) {
        match self.spi0_offset(addr) {
            Some(offset) => {
                self.sync_clock();
                self.spi0.write32(offset, value);
            }
            None => {
                self.regs.insert(addr, value);
            }
        }
    }

    fn read8(&mut self, addr: usize) -> u8 {
        match self.spi0_offset(addr) {
            Some(offset) => self.spi0.read8(offset),
            None => self.reg(addr & !3).to_le_bytes()[addr & 3],
        }
    }

    fn write8(&mut self, addr: usize, value: u8) {
        match self.spi0_offset(addr) {
            Some(offset) => {
                self.sync_clock();
                self.spi0.write8(offset, value);
            }
            None => {
                let mut bytes = self.reg(addr & !3).to_le_bytes();
                bytes[addr & 3] = value;
                self.regs.insert(addr & !3, u32::from_le_bytes(bytes));
            }
        }
    }
}
