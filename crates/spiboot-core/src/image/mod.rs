//! Boot image headers
//!
//! The loader itself does not understand image formats. It reads the first
//! [`HEADER_SIZE`] bytes at the image offset and hands them to an
//! [`ImageHeaderOps`] implementation. [`LegacyImage`] handles the classic
//! uImage header; FIT containers are only recognised here and are loaded
//! by a [`FitLoader`](crate::loader::FitLoader).

mod legacy;

pub use legacy::{LegacyHeader, LegacyImage, IH_MAGIC, IH_NMLEN};

use crate::error::Result;

/// Bytes read from flash before deciding how to load the image
pub const HEADER_SIZE: usize = 64;

/// Flattened device tree magic, first word of a FIT container
pub const FDT_MAGIC: u32 = 0xD00D_FEED;

/// Raw header bytes as read from flash
pub type RawHeader = [u8; HEADER_SIZE];

/// First word of a header, big-endian
pub fn image_magic(header: &RawHeader) -> u32 {
    u32::from_be_bytes([header[0], header[1], header[2], header[3]])
}

/// True if `header` starts a FIT container
pub fn is_fit(header: &RawHeader) -> bool {
    image_magic(header) == FDT_MAGIC
}

/// Where and how big the next boot stage is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Address the image is copied to
    pub load_address: u32,
    /// Address execution starts at
    pub entry_point: u32,
    /// Bytes to copy, starting at the image offset in flash
    pub size: u32,
    /// NUL-padded image name
    pub name: [u8; IH_NMLEN],
}

impl ImageInfo {
    /// Image name up to the first NUL, empty if it is not UTF-8
    pub fn name(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(IH_NMLEN);
        core::str::from_utf8(&self.name[..end]).unwrap_or("")
    }

    /// Build an info record with a name, truncated to [`IH_NMLEN`] bytes
    pub fn new(load_address: u32, entry_point: u32, size: u32, name: &str) -> Self {
        let mut buf = [0u8; IH_NMLEN];
        let len = name.len().min(IH_NMLEN);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self {
            load_address,
            entry_point,
            size,
            name: buf,
        }
    }
}

/// Boot image header validation and parsing
pub trait ImageHeaderOps {
    /// True if the header checksum is valid
    fn check_header(&self, header: &RawHeader) -> bool;

    /// Extract load address, size and entry point
    fn parse_header(&self, header: &RawHeader) -> Result<ImageInfo>;
}

impl<T: ImageHeaderOps + ?Sized> ImageHeaderOps for &T {
    fn check_header(&self, header: &RawHeader) -> bool {
        (**self).check_header(header)
    }

    fn parse_header(&self, header: &RawHeader) -> Result<ImageInfo> {
        (**self).parse_header(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_magic() {
        let mut header = [0u8; HEADER_SIZE];
        header[..4].copy_from_slice(&[0xD0, 0x0D, 0xFE, 0xED]);
        assert!(is_fit(&header));
        header[0] = 0x27;
        assert!(!is_fit(&header));
    }

    #[test]
    fn test_info_name() {
        let info = ImageInfo::new(0, 0, 0, "U-Boot 2024.01");
        assert_eq!(info.name(), "U-Boot 2024.01");

        let long = ImageInfo::new(0, 0, 0, "0123456789abcdef0123456789abcdefXYZ");
        assert_eq!(long.name(), "0123456789abcdef0123456789abcdef");
    }
}
