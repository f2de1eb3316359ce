//! Chunked flash reads
//!
//! The SPI0 FIFO is 64 bytes deep and a read command header takes up to
//! four of them, so every read is split into bursts of at most
//! [`FIFO_DATA_CAPACITY`] bytes. SPI NAND additionally needs each page
//! loaded into the chip's cache before it can be read; see [`nand`].

mod nand;
mod nor;

use embedded_hal::delay::DelayNs;

use crate::chip::Medium;
use crate::protocol::SpiEngine;
use crate::transport::RegisterBus;

/// Largest payload of a single read burst
pub const FIFO_DATA_CAPACITY: usize = 60;

/// Progress through one read request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadCursor {
    /// Next flash address to read
    pub addr: u32,
    /// Bytes still to read
    pub remaining: usize,
    /// Offset into the destination buffer
    pub offset: usize,
}

impl ReadCursor {
    /// Start a read of `len` bytes at `addr`
    pub const fn new(addr: u32, len: usize) -> Self {
        Self {
            addr,
            remaining: len,
            offset: 0,
        }
    }

    /// Account for `len` bytes read
    pub fn advance(&mut self, len: usize) {
        self.addr = self.addr.wrapping_add(len as u32);
        self.remaining -= len;
        self.offset += len;
    }

    /// Size of the next burst before page clipping
    pub fn next_burst(&self) -> usize {
        self.remaining.min(FIFO_DATA_CAPACITY)
    }
}

/// The page currently held in the NAND chip's cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageCache {
    cached_page: Option<u32>,
}

impl PageCache {
    /// Page index last loaded, if any
    pub fn cached_page(&self) -> Option<u32> {
        self.cached_page
    }

    /// True if `page` lies beyond the cached page
    pub fn needs_load(&self, page: u32) -> bool {
        self.cached_page.map_or(true, |cached| page > cached)
    }

    fn loaded(&mut self, page: u32) {
        self.cached_page = Some(page);
    }

    /// Forget the cached page
    pub fn invalidate(&mut self) {
        self.cached_page = None;
    }
}

/// Reads arbitrary ranges from the attached flash
pub struct FlashReader<B: RegisterBus, D: DelayNs> {
    engine: SpiEngine<B, D>,
    medium: Medium,
    cache: PageCache,
}

impl<B: RegisterBus, D: DelayNs> FlashReader<B, D> {
    /// Create a reader for `medium`
    pub fn new(engine: SpiEngine<B, D>, medium: Medium) -> Self {
        Self {
            engine,
            medium,
            cache: PageCache::default(),
        }
    }

    /// Storage kind being read
    pub fn medium(&self) -> Medium {
        self.medium
    }

    /// NAND page cache state
    pub fn page_cache(&self) -> &PageCache {
        &self.cache
    }

    /// Forget which page the NAND cache holds
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Fill `buf` from flash starting at `addr`
    pub fn read(&mut self, addr: u32, buf: &mut [u8]) {
        log::trace!("read {:#x}+{:#x}", addr, buf.len());
        match self.medium {
            Medium::Nor => nor::read(&mut self.engine, addr, buf),
            Medium::Nand(geometry) => {
                nand::read(&mut self.engine, geometry, &mut self.cache, addr, buf)
            }
        }
    }

    /// Tear down the transport
    pub fn shutdown(self) {
        self.engine.shutdown();
    }
}

impl<B: RegisterBus, D: DelayNs> core::fmt::Debug for FlashReader<B, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlashReader")
            .field("medium", &self.medium)
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advance() {
        let mut c = ReadCursor::new(0x100, 130);
        assert_eq!(c.next_burst(), 60);
        c.advance(60);
        assert_eq!(c, ReadCursor { addr: 0x13C, remaining: 70, offset: 60 });
        c.advance(60);
        assert_eq!(c.next_burst(), 10);
    }

    #[test]
    fn test_page_cache() {
        let mut cache = PageCache::default();
        assert!(cache.needs_load(0));
        cache.loaded(3);
        assert!(!cache.needs_load(3));
        assert!(!cache.needs_load(2));
        assert!(cache.needs_load(4));
        cache.invalidate();
        assert_eq!(cache.cached_page(), None);
    }
}
