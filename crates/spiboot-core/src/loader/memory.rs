//! Destination memory for the loaded image

use crate::error::{Error, Result};

/// Memory the next boot stage is copied into
pub trait LoadMemory {
    /// Writable window of `len` bytes at physical address `addr`
    fn region(&mut self, addr: u32, len: u32) -> Result<&mut [u8]>;
}

impl<T: LoadMemory + ?Sized> LoadMemory for &mut T {
    fn region(&mut self, addr: u32, len: u32) -> Result<&mut [u8]> {
        (**self).region(addr, len)
    }
}

/// Direct access to physical memory
///
/// Used on the SoC, where the image header decides where the payload lands.
#[derive(Debug)]
pub struct PhysicalMemory {
    _private: (),
}

impl PhysicalMemory {
    /// Create the physical memory window
    ///
    /// # Safety
    ///
    /// Any address an image header names will be written to. The caller
    /// must run with a flat physical mapping and must not keep references
    /// into memory an image may be loaded over.
    pub unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl LoadMemory for PhysicalMemory {
    fn region(&mut self, addr: u32, len: u32) -> Result<&mut [u8]> {
        // A slice cannot start at the null address. On the SoCs with SRAM
        // A1 at 0 that is where the running stage executes, so no image
        // is loaded there.
        if addr == 0 || (addr as u64 + len as u64) > u32::MAX as u64 + 1 {
            return Err(Error::AddressOutOfRange);
        }
        // SAFETY: the range is non-null and inside the 32-bit physical
        // space; exclusivity is promised by the caller of `new`
        Ok(unsafe { core::slice::from_raw_parts_mut(addr as usize as *mut u8, len as usize) })
    }
}
