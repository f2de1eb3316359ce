//! Simulated DRAM window

use spiboot_core::error::{Error, Result};
use spiboot_core::loader::LoadMemory;

/// A RAM window at a fixed physical base
#[derive(Debug, Clone)]
pub struct SimMemory {
    base: u32,
    data: Vec<u8>,
}

impl SimMemory {
    /// Zero-filled window of `size` bytes at `base`
    pub fn new(base: u32, size: usize) -> Self {
        Self {
            base,
            data: vec![0; size],
        }
    }

    /// Window base address
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Contents of `len` bytes at physical address `addr`, if inside
    pub fn slice(&self, addr: u32, len: usize) -> Option<&[u8]> {
        let start = addr.checked_sub(self.base)? as usize;
        self.data.get(start..start.checked_add(len)?)
    }
}

impl LoadMemory for SimMemory {
    fn region(&mut self, addr: u32, len: u32) -> Result<&mut [u8]> {
        let start = addr.checked_sub(self.base).ok_or(Error::AddressOutOfRange)? as usize;
        let end = start
            .checked_add(len as usize)
            .ok_or(Error::AddressOutOfRange)?;
        self.data
            .get_mut(start..end)
            .ok_or(Error::AddressOutOfRange)
    }
}
