//! SPI command frame structure

use super::{opcodes, AddressWidth};

/// Largest header a frame can produce: opcode, 3 address bytes, 1 dummy
pub const MAX_HEADER_LEN: usize = 5;

/// The transmitted part of a single SPI exchange
///
/// A frame is the opcode, an optional address and optional dummy bytes.
/// Everything the controller clocks in after the header is the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    /// The opcode byte
    pub opcode: u8,

    /// Address (if any)
    pub address: u32,

    /// Address width
    pub address_width: AddressWidth,

    /// Number of dummy bytes after the address (0 or 1)
    pub dummy_bytes: u8,
}

impl CommandFrame {
    /// Create a bare opcode frame
    pub const fn simple(opcode: u8) -> Self {
        Self {
            opcode,
            address: 0,
            address_width: AddressWidth::None,
            dummy_bytes: 0,
        }
    }

    /// Read identifier; SPI NAND wants one dummy byte before the ID
    pub const fn read_id(dummy_bytes: u8) -> Self {
        Self::simple(opcodes::RDID).with_dummy_bytes(dummy_bytes)
    }

    /// NOR Read Data with a 3-byte byte address
    pub const fn nor_read(addr: u32) -> Self {
        Self {
            opcode: opcodes::READ,
            address: addr,
            address_width: AddressWidth::ThreeByte,
            dummy_bytes: 0,
        }
    }

    /// NAND Page Read to cache with a 3-byte row address
    pub const fn page_read(row: u32) -> Self {
        Self {
            opcode: opcodes::PAGE_READ,
            address: row,
            address_width: AddressWidth::ThreeByte,
            dummy_bytes: 0,
        }
    }

    /// NAND Get Feature on the status register (`0F C0`)
    pub const fn read_status() -> Self {
        Self {
            opcode: opcodes::GET_FEATURE,
            address: opcodes::FEATURE_STATUS as u32,
            address_width: AddressWidth::OneByte,
            dummy_bytes: 0,
        }
    }

    /// NAND Read From Cache with a 2-byte column and one dummy byte
    pub const fn read_from_cache(column: u32) -> Self {
        Self {
            opcode: opcodes::READ_FROM_CACHE,
            address: column,
            address_width: AddressWidth::TwoByte,
            dummy_bytes: 1,
        }
    }

    /// Set the number of dummy bytes
    pub const fn with_dummy_bytes(mut self, count: u8) -> Self {
        self.dummy_bytes = count;
        self
    }

    /// Number of bytes transmitted before the response starts
    pub const fn header_len(&self) -> usize {
        1 + self.address_width.bytes() as usize + self.dummy_bytes as usize
    }

    /// Serialise the header in command order, returning its length
    pub fn encode(&self, buf: &mut [u8; MAX_HEADER_LEN]) -> usize {
        let addr_len = self.address_width.bytes() as usize;
        buf[0] = self.opcode;
        self.address_width
            .encode(self.address, &mut buf[1..1 + addr_len]);
        let len = self.header_len();
        for b in &mut buf[1 + addr_len..len] {
            *b = opcodes::DUMMY_BYTE;
        }
        len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_read_header() {
        let frame = CommandFrame::read_from_cache(0x7F3);
        let mut buf = [0xAAu8; MAX_HEADER_LEN];
        let len = frame.encode(&mut buf);
        assert_eq!(len, 4);
        assert_eq!(&buf[..len], &[0x0B, 0x07, 0xF3, 0x00]);
    }

    #[test]
    fn test_page_read_header() {
        let frame = CommandFrame::page_read(0x012345);
        let mut buf = [0u8; MAX_HEADER_LEN];
        let len = frame.encode(&mut buf);
        assert_eq!(&buf[..len], &[0x13, 0x01, 0x23, 0x45]);
    }

    #[test]
    fn test_status_and_id_headers() {
        let mut buf = [0u8; MAX_HEADER_LEN];
        let len = CommandFrame::read_status().encode(&mut buf);
        assert_eq!(&buf[..len], &[0x0F, 0xC0]);

        let len = CommandFrame::read_id(1).encode(&mut buf);
        assert_eq!(&buf[..len], &[0x9F, 0x00]);

        let len = CommandFrame::read_id(0).encode(&mut buf);
        assert_eq!(&buf[..len], &[0x9F]);
    }

    #[test]
    fn test_nor_read_has_no_dummy() {
        let frame = CommandFrame::nor_read(0x00_8000);
        assert_eq!(frame.header_len(), 4);
    }
}
