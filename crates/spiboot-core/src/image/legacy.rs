//! Legacy uImage header

use crc::{Crc, CRC_32_ISO_HDLC};
use zerocopy::byteorder::{BigEndian, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::{is_fit, ImageHeaderOps, ImageInfo, RawHeader, HEADER_SIZE};
use crate::error::{Error, Result};

/// Legacy image magic
pub const IH_MAGIC: u32 = 0x2705_1956;
/// Length of the image name field
pub const IH_NMLEN: usize = 32;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// On-flash layout of a legacy image header, all fields big-endian
#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct LegacyHeader {
    /// Magic number
    pub ih_magic: U32<BigEndian>,
    /// Header CRC, computed with this field zeroed
    pub ih_hcrc: U32<BigEndian>,
    /// Creation timestamp
    pub ih_time: U32<BigEndian>,
    /// Payload size, header excluded
    pub ih_size: U32<BigEndian>,
    /// Payload load address
    pub ih_load: U32<BigEndian>,
    /// Entry point
    pub ih_ep: U32<BigEndian>,
    /// Payload CRC
    pub ih_dcrc: U32<BigEndian>,
    /// Operating system
    pub ih_os: u8,
    /// CPU architecture
    pub ih_arch: u8,
    /// Image type
    pub ih_type: u8,
    /// Compression
    pub ih_comp: u8,
    /// Image name
    pub ih_name: [u8; IH_NMLEN],
}

const _: () = assert!(core::mem::size_of::<LegacyHeader>() == HEADER_SIZE);

// Firmware image of an ARM build, uncompressed
const IH_OS_U_BOOT: u8 = 17;
const IH_ARCH_ARM: u8 = 2;
const IH_TYPE_FIRMWARE: u8 = 5;
const IH_COMP_NONE: u8 = 0;

impl LegacyHeader {
    /// View raw bytes as a header
    pub fn from_raw(raw: &RawHeader) -> &Self {
        zerocopy::transmute_ref!(raw)
    }

    /// CRC of the header with `ih_hcrc` treated as zero
    pub fn compute_hcrc(&self) -> u32 {
        let mut copy = *self;
        copy.ih_hcrc = U32::new(0);
        CRC32.checksum(copy.as_bytes())
    }

    /// Build a header for `payload`, with both checksums filled in
    pub fn for_payload(load: u32, entry: u32, name: &str, payload: &[u8]) -> RawHeader {
        let mut ih_name = [0u8; IH_NMLEN];
        let len = name.len().min(IH_NMLEN);
        ih_name[..len].copy_from_slice(&name.as_bytes()[..len]);

        let mut header = Self {
            ih_magic: U32::new(IH_MAGIC),
            ih_hcrc: U32::new(0),
            ih_time: U32::new(0),
            ih_size: U32::new(payload.len() as u32),
            ih_load: U32::new(load),
            ih_ep: U32::new(entry),
            ih_dcrc: U32::new(CRC32.checksum(payload)),
            ih_os: IH_OS_U_BOOT,
            ih_arch: IH_ARCH_ARM,
            ih_type: IH_TYPE_FIRMWARE,
            ih_comp: IH_COMP_NONE,
            ih_name,
        };
        header.ih_hcrc = U32::new(header.compute_hcrc());

        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(header.as_bytes());
        raw
    }
}

/// [`ImageHeaderOps`] for legacy uImage headers
///
/// The image is copied together with its header, so the load address is
/// moved down by [`HEADER_SIZE`] and the size grows by the same amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyImage;

impl ImageHeaderOps for LegacyImage {
    fn check_header(&self, header: &RawHeader) -> bool {
        // FIT containers carry their own hashes
        if is_fit(header) {
            return true;
        }
        let hdr = LegacyHeader::from_raw(header);
        hdr.compute_hcrc() == hdr.ih_hcrc.get()
    }

    fn parse_header(&self, header: &RawHeader) -> Result<ImageInfo> {
        let hdr = LegacyHeader::from_raw(header);
        if hdr.ih_magic.get() != IH_MAGIC {
            log::error!("not a legacy image: magic {:#010x}", hdr.ih_magic.get());
            return Err(Error::ImageParseError);
        }
        let load_address = hdr
            .ih_load
            .get()
            .checked_sub(HEADER_SIZE as u32)
            .ok_or(Error::ImageParseError)?;
        let size = hdr
            .ih_size
            .get()
            .checked_add(HEADER_SIZE as u32)
            .ok_or(Error::ImageParseError)?;

        let info = ImageInfo {
            load_address,
            // ih_ep, which need not equal the load address
            entry_point: hdr.ih_ep.get(),
            size,
            name: hdr.ih_name,
        };
        log::debug!(
            "legacy image '{}': load {:#x} size {:#x} entry {:#x}",
            info.name(),
            info.load_address,
            info.size,
            info.entry_point
        );
        Ok(info)
    }
}
