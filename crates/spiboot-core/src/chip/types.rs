//! Flash geometry type definitions

/// Addressing geometry of a SPI NAND part
///
/// A byte address `addr` splits into a row (page) address
/// `(addr >> page_shift) & page_mask` for Page Read and a column address
/// `(addr >> column_shift) & column_mask` for Read From Cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashGeometry {
    /// Part name
    pub name: &'static str,
    /// 24-bit identifier as returned by Read ID
    pub jedec_id: u32,
    /// log2 of the page size
    pub page_shift: u8,
    /// Mask applied to the row address
    pub page_mask: u32,
    /// Mask applied to the column address
    pub column_mask: u32,
    /// Shift applied before masking the column address
    pub column_shift: u8,
}

impl FlashGeometry {
    /// 2 KiB page geometry shared by nearly every 1-4 Gbit SPI NAND
    pub const fn generic_2k(name: &'static str, jedec_id: u32) -> Self {
        Self {
            name,
            jedec_id,
            page_shift: 11,
            page_mask: 0x00FF_FFFF,
            column_mask: 0x7FF,
            column_shift: 0,
        }
    }

    /// Same as [`generic_2k`](Self::generic_2k) with a narrower row mask
    pub const fn with_page_mask(mut self, page_mask: u32) -> Self {
        self.page_mask = page_mask;
        self
    }

    /// Page size in bytes
    pub const fn page_size(&self) -> u32 {
        1 << self.page_shift
    }

    /// Page index of `addr`, without the row mask
    pub const fn page_of(&self, addr: u32) -> u32 {
        addr >> self.page_shift
    }

    /// Row address sent with Page Read
    pub const fn row_address(&self, addr: u32) -> u32 {
        self.page_of(addr) & self.page_mask
    }

    /// Column address sent with Read From Cache
    pub const fn column_address(&self, addr: u32) -> u32 {
        (addr >> self.column_shift) & self.column_mask
    }

    /// First byte address of the page after the one holding `addr`
    ///
    /// Wider than an address so the last page of a 4 GiB space has one.
    pub const fn next_page_boundary(&self, addr: u32) -> u64 {
        ((self.page_of(addr) as u64) + 1) << self.page_shift
    }

    /// Manufacturer byte of the identifier
    pub const fn manufacturer_id(&self) -> u8 {
        (self.jedec_id >> 16) as u8
    }
}

/// Storage kind the reader operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medium {
    /// SPI NOR, byte addressed with Read Data (03h)
    Nor,
    /// SPI NAND with the given geometry
    Nand(&'static FlashGeometry),
}

impl Medium {
    /// NAND geometry, if any
    pub fn geometry(&self) -> Option<&'static FlashGeometry> {
        match self {
            Self::Nor => None,
            Self::Nand(g) => Some(g),
        }
    }
}

/// Which kind of flash the board boots from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediumKind {
    /// SPI NOR
    #[default]
    Nor,
    /// SPI NAND
    Nand,
}

impl MediumKind {
    /// Dummy bytes between Read ID and the identifier
    pub const fn id_dummy_bytes(&self) -> u8 {
        match self {
            Self::Nor => 0,
            Self::Nand => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_split() {
        let g = FlashGeometry::generic_2k("test", 0x00C212C2);
        assert_eq!(g.page_size(), 2048);
        assert_eq!(g.row_address(0x0004_0000), 0x80);
        assert_eq!(g.column_address(0x0004_07F3), 0x7F3);
        assert_eq!(g.next_page_boundary(2040), 2048);
        assert_eq!(g.next_page_boundary(2048), 4096);
        assert_eq!(g.manufacturer_id(), 0xC2);
    }

    #[test]
    fn test_narrow_page_mask() {
        let g = FlashGeometry::generic_2k("test", 0x00EFAA21).with_page_mask(0xFFFF);
        assert_eq!(g.row_address(0x1_0000 << 11), 0);
        assert_eq!(g.page_of(0x1_0000 << 11), 0x1_0000);
    }
}
