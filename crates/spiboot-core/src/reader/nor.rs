//! SPI NOR reads

use embedded_hal::delay::DelayNs;

use super::ReadCursor;
use crate::protocol::SpiEngine;
use crate::transport::RegisterBus;

/// Read `buf.len()` bytes at `addr`, one Read Data command per burst
pub(super) fn read<B: RegisterBus, D: DelayNs>(
    engine: &mut SpiEngine<B, D>,
    addr: u32,
    buf: &mut [u8],
) {
    let mut cursor = ReadCursor::new(addr, buf.len());
    while cursor.remaining > 0 {
        let len = cursor.next_burst();
        let n = engine.nor_read(cursor.addr, &mut buf[cursor.offset..cursor.offset + len]);
        cursor.advance(n);
    }
}
