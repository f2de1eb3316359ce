//! SPI NAND reads
//!
//! A read alternates between two states. In `PageLoading` the page holding
//! the cursor is moved into the chip cache with Page Read and the status
//! register is polled until the operation-in-progress bit clears. In
//! `CacheReadable` bursts are read with Read From Cache until the cursor
//! crosses into a page beyond the cached one. Bursts never straddle a
//! page boundary.
//!
//! Page numbers are compared before the row mask is applied. On parts with
//! a narrow row mask the row address wraps, but the cursor still moves
//! forward, so a wrapped row is loaded instead of being mistaken for the
//! cached page.

use embedded_hal::delay::DelayNs;

use super::{PageCache, ReadCursor};
use crate::chip::FlashGeometry;
use crate::protocol::SpiEngine;
use crate::transport::RegisterBus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    PageLoading,
    CacheReadable,
}

pub(super) fn read<B: RegisterBus, D: DelayNs>(
    engine: &mut SpiEngine<B, D>,
    geometry: &FlashGeometry,
    cache: &mut PageCache,
    addr: u32,
    buf: &mut [u8],
) {
    let mut cursor = ReadCursor::new(addr, buf.len());
    // The chip may have been used by someone else since the last call
    let mut state = State::PageLoading;

    while cursor.remaining > 0 {
        let page = geometry.page_of(cursor.addr);
        if state == State::CacheReadable && cache.needs_load(page) {
            state = State::PageLoading;
        }

        if state == State::PageLoading {
            log::trace!("nand: load page {:#x}", page);
            engine.nand_page_read_to_cache(geometry.row_address(cursor.addr));
            cache.loaded(page);
            state = State::CacheReadable;
        }

        let to_boundary = geometry.next_page_boundary(cursor.addr) - cursor.addr as u64;
        let len = (cursor.next_burst() as u64).min(to_boundary) as usize;
        let n = engine.nand_read_from_cache(
            geometry.column_address(cursor.addr),
            &mut buf[cursor.offset..cursor.offset + len],
        );
        cursor.advance(n);
    }
}
