//! Address width types

/// Address width for SPI command frames
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// No address phase
    #[default]
    None,
    /// 1-byte address (SPI NAND feature address)
    OneByte,
    /// 2-byte address (SPI NAND column address)
    TwoByte,
    /// 3-byte address (NOR byte address, SPI NAND row address)
    ThreeByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::OneByte => 1,
            Self::TwoByte => 2,
            Self::ThreeByte => 3,
        }
    }

    /// Encode an address into bytes, most significant byte first
    pub fn encode(&self, address: u32, buf: &mut [u8]) {
        match self {
            Self::None => {}
            Self::OneByte => {
                buf[0] = address as u8;
            }
            Self::TwoByte => {
                buf[0] = (address >> 8) as u8;
                buf[1] = address as u8;
            }
            Self::ThreeByte => {
                buf[0] = (address >> 16) as u8;
                buf[1] = (address >> 8) as u8;
                buf[2] = address as u8;
            }
        }
    }
}
