//! Register access
//!
//! All hardware access of the loader goes through [`RegisterBus`]. On the
//! SoC this is [`Mmio`]; on a host the register block is simulated.

/// Byte and word access to memory-mapped registers at absolute addresses
pub trait RegisterBus {
    /// Read a 32-bit register
    fn read32(&mut self, addr: usize) -> u32;

    /// Write a 32-bit register
    fn write32(&mut self, addr: usize, value: u32);

    /// Read an 8-bit register
    fn read8(&mut self, addr: usize) -> u8;

    /// Write an 8-bit register
    fn write8(&mut self, addr: usize, value: u8);

    /// Read-modify-write setting `bits`
    fn set_bits32(&mut self, addr: usize, bits: u32) {
        let val = self.read32(addr);
        self.write32(addr, val | bits);
    }

    /// Read-modify-write clearing `bits`
    fn clear_bits32(&mut self, addr: usize, bits: u32) {
        let val = self.read32(addr);
        self.write32(addr, val & !bits);
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn read32(&mut self, addr: usize) -> u32 {
        (**self).read32(addr)
    }

    fn write32(&mut self, addr: usize, value: u32) {
        (**self).write32(addr, value)
    }

    fn read8(&mut self, addr: usize) -> u8 {
        (**self).read8(addr)
    }

    fn write8(&mut self, addr: usize, value: u8) {
        (**self).write8(addr, value)
    }

    fn set_bits32(&mut self, addr: usize, bits: u32) {
        (**self).set_bits32(addr, bits)
    }

    fn clear_bits32(&mut self, addr: usize, bits: u32) {
        (**self).clear_bits32(addr, bits)
    }
}

/// Volatile access to the physical address space
///
/// The boot stage runs with the MMU off, so register addresses are used
/// as pointers directly.
#[derive(Debug)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create the physical register bus
    ///
    /// # Safety
    ///
    /// The caller must run with a flat physical mapping and must not hand
    /// out a second `Mmio` while this one touches the SPI0, CCU and PIO
    /// register blocks.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline]
    fn read32(&mut self, addr: usize) -> u32 {
        debug_assert!(addr & 3 == 0, "unaligned 32-bit read");
        // SAFETY: exclusive access to an identity-mapped register, see `new`
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }

    #[inline]
    fn write32(&mut self, addr: usize, value: u32) {
        debug_assert!(addr & 3 == 0, "unaligned 32-bit write");
        // SAFETY: exclusive access to an identity-mapped register, see `new`
        unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
    }

    #[inline]
    fn read8(&mut self, addr: usize) -> u8 {
        // SAFETY: exclusive access to an identity-mapped register, see `new`
        unsafe { core::ptr::read_volatile(addr as *const u8) }
    }

    #[inline]
    fn write8(&mut self, addr: usize, value: u8) {
        // SAFETY: exclusive access to an identity-mapped register, see `new`
        unsafe { core::ptr::write_volatile(addr as *mut u8, value) }
    }
}
