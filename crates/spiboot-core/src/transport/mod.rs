//! SPI0 transport
//!
//! [`TransportHandle`] is the one value that means "SPI0 is muxed, clocked
//! and enabled". It owns the register bus, so no other code can touch the
//! controller while it is alive. [`TransportHandle::deinit`] undoes
//! everything `init` did; dropping a live handle does the same, so the
//! peripheral is never left running on an early return.

mod bus;

pub use bus::{Mmio, RegisterBus};

use crate::controller::{ControllerVariant, RegisterLayout};
use crate::gpio;
use crate::target::{TargetDescriptor, SPI0_MODULE_CLK_EN};

/// Owned, configured SPI0 controller
pub struct TransportHandle<B: RegisterBus> {
    bus: B,
    target: TargetDescriptor,
    live: bool,
}

impl<B: RegisterBus> TransportHandle<B> {
    /// Mux the SPI0 pins, start its clocks and enable the controller
    ///
    /// On sun6i-style controllers this waits for the soft reset to
    /// complete. The wait has no bound.
    pub fn init(bus: B, target: TargetDescriptor) -> Self {
        let mut handle = Self {
            bus,
            target,
            live: true,
        };
        log::debug!(
            "spi0: init {} ({} controller at {:#010x})",
            target.name,
            target.variant,
            target.spi0_base
        );
        handle.configure_pins(target.pin_function);
        handle.enable_clock();
        handle
    }

    /// Disable the controller, stop its clocks and park the pins
    pub fn deinit(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        log::debug!("spi0: deinit");
        self.disable_clock();
        self.configure_pins(self.target.inert_function);
    }

    /// Route the four SPI0 pins to `function`
    pub fn configure_pins(&mut self, function: u8) {
        for pin in self.target.pins {
            gpio::set_cfgpin(&mut self.bus, &self.target.pio, pin, function);
        }
    }

    /// Release reset, open the gate, program the divider and enable the
    /// controller in master mode
    pub fn enable_clock(&mut self) {
        let clocks = self.target.clocks;
        let base = self.target.spi0_base;
        let variant = self.target.variant;

        if let Some(reset) = clocks.reset {
            self.bus.set_bits32(reset.addr, reset.bits);
        }
        if let Some(gate) = clocks.gate {
            self.bus.set_bits32(gate.addr, gate.bits);
        }
        if let Some(div) = clocks.divider {
            self.bus.write32(base + variant.layout().clock_ctl, div);
        }
        if let Some(module) = clocks.module_clock {
            self.bus.write32(module, SPI0_MODULE_CLK_EN);
        }

        let ctl = base + variant.layout().global_ctl;
        self.bus.set_bits32(ctl, variant.enable_bits());
        if let Some(busy) = variant.reset_busy_bit() {
            while self.bus.read32(ctl) & busy != 0 {}
        }
    }

    /// Reverse of [`enable_clock`](Self::enable_clock)
    pub fn disable_clock(&mut self) {
        let clocks = self.target.clocks;
        let variant = self.target.variant;

        self.bus.clear_bits32(
            self.target.spi0_base + variant.layout().global_ctl,
            variant.disable_bits(),
        );
        if let Some(module) = clocks.module_clock {
            self.bus.write32(module, 0);
        }
        if let Some(gate) = clocks.gate {
            self.bus.clear_bits32(gate.addr, gate.bits);
        }
        if let Some(reset) = clocks.reset {
            self.bus.clear_bits32(reset.addr, reset.bits);
        }
    }

    /// SPI0 register block base address
    pub fn base_address(&self) -> usize {
        self.target.spi0_base
    }

    /// True when the controller is the sun6i-style one
    pub fn is_gen_b(&self) -> bool {
        self.target.variant.is_gen_b()
    }

    /// Controller generation
    pub fn variant(&self) -> ControllerVariant {
        self.target.variant
    }

    /// Register layout of the controller
    pub fn layout(&self) -> &'static RegisterLayout {
        self.target.variant.layout()
    }

    /// Target this handle was created for
    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    /// Read a 32-bit controller register
    #[inline]
    pub fn read_reg(&mut self, offset: usize) -> u32 {
        self.bus.read32(self.target.spi0_base + offset)
    }

    /// Write a 32-bit controller register
    #[inline]
    pub fn write_reg(&mut self, offset: usize, value: u32) {
        self.bus.write32(self.target.spi0_base + offset, value)
    }

    /// Set bits in a controller register
    #[inline]
    pub fn set_reg_bits(&mut self, offset: usize, bits: u32) {
        self.bus.set_bits32(self.target.spi0_base + offset, bits)
    }

    /// Read a byte from a controller register
    #[inline]
    pub fn read_reg8(&mut self, offset: usize) -> u8 {
        self.bus.read8(self.target.spi0_base + offset)
    }

    /// Write a byte to a controller register
    #[inline]
    pub fn write_reg8(&mut self, offset: usize, value: u8) {
        self.bus.write8(self.target.spi0_base + offset, value)
    }
}

impl<B: RegisterBus> Drop for TransportHandle<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<B: RegisterBus> core::fmt::Debug for TransportHandle<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TransportHandle")
            .field("target", &self.target.name)
            .field("live", &self.live)
            .finish()
    }
}
