//! Boot image loader
//!
//! [`BootLoader::load`] is the whole boot-device method: bring SPI0 up,
//! identify the flash, read the image header at the configured offset and
//! either stream a raw image to its load address or hand a lazy read
//! callback to a FIT loader. SPI0 is shut down again on every path out.

mod memory;

pub use memory::{LoadMemory, PhysicalMemory};

use embedded_hal::delay::DelayNs;

use crate::chip::{resolve, Medium, MediumKind, Resolution};
use crate::error::{Error, Result};
use crate::image::{is_fit, ImageHeaderOps, ImageInfo, RawHeader, HEADER_SIZE};
use crate::protocol::{SpiEngine, Timing};
use crate::reader::FlashReader;
use crate::target::TargetDescriptor;
use crate::transport::{RegisterBus, TransportHandle};

/// Boot configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootConfig {
    /// Size of the running stage as stored in flash
    pub own_image_size: u32,
    /// Configured offset of the next stage
    pub image_offset: u32,
    /// Flash kind on SPI0
    pub medium: MediumKind,
    /// Use the generic 2 KiB geometry for unknown SPI NAND parts
    pub allow_generic_nand: bool,
    /// Hand FIT containers to the FIT loader
    pub load_fit: bool,
    /// Settle delays
    pub timing: Timing,
}

impl BootConfig {
    /// Boot from SPI NOR
    pub fn nor(own_image_size: u32, image_offset: u32) -> Self {
        Self {
            own_image_size,
            image_offset,
            medium: MediumKind::Nor,
            allow_generic_nand: false,
            load_fit: true,
            timing: Timing::default(),
        }
    }

    /// Boot from SPI NAND
    pub fn nand(own_image_size: u32, image_offset: u32) -> Self {
        Self {
            medium: MediumKind::Nand,
            ..Self::nor(own_image_size, image_offset)
        }
    }

    /// Flash offset of the next stage
    ///
    /// The running stage may have outgrown the configured offset, in which
    /// case the next stage directly follows it.
    pub fn load_offset(&self) -> u32 {
        self.own_image_size.max(self.image_offset)
    }
}

/// Byte-granular read access handed to a FIT loader
pub trait LoadSource {
    /// Read granularity; addresses and counts are in bytes
    fn block_len(&self) -> u32 {
        1
    }

    /// Read `count` bytes at flash offset `sector` into `buf`
    ///
    /// Returns the number of bytes read, which is `count` unless `buf` is
    /// shorter.
    fn read(&mut self, sector: u32, count: u32, buf: &mut [u8]) -> u32;

    /// Flash being read
    fn medium(&self) -> Medium;
}

impl<B: RegisterBus, D: DelayNs> LoadSource for FlashReader<B, D> {
    fn read(&mut self, sector: u32, count: u32, buf: &mut [u8]) -> u32 {
        let len = (count as usize).min(buf.len());
        FlashReader::read(self, sector, &mut buf[..len]);
        len as u32
    }

    fn medium(&self) -> Medium {
        FlashReader::medium(self)
    }
}

/// Loader for FIT containers
pub trait FitLoader {
    /// Load the container starting at `offset`, whose first bytes are
    /// `header`, pulling data through `source`
    fn load_fit(
        &mut self,
        source: &mut dyn LoadSource,
        offset: u32,
        header: &RawHeader,
    ) -> Result<ImageInfo>;
}

impl<T: FitLoader + ?Sized> FitLoader for &mut T {
    fn load_fit(
        &mut self,
        source: &mut dyn LoadSource,
        offset: u32,
        header: &RawHeader,
    ) -> Result<ImageInfo> {
        (**self).load_fit(source, offset, header)
    }
}

/// FIT loader for builds without FIT support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFit;

impl FitLoader for NoFit {
    fn load_fit(&mut self, _: &mut dyn LoadSource, _: u32, _: &RawHeader) -> Result<ImageInfo> {
        log::error!("FIT support not built in");
        Err(Error::FitLoadFailed)
    }
}

/// SPI flash boot-device method
#[derive(Debug, Clone, Copy)]
pub struct BootLoader {
    target: TargetDescriptor,
    config: BootConfig,
}

impl BootLoader {
    /// Create a loader for `target`
    pub fn new(target: TargetDescriptor, config: BootConfig) -> Self {
        Self { target, config }
    }

    /// Configuration in use
    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    /// Load the next boot stage
    ///
    /// Takes ownership of the register bus for the duration of the load;
    /// pass `&mut bus` to keep it.
    pub fn load<B, D, H, F, M>(
        &self,
        bus: B,
        delay: D,
        headers: &H,
        fit: &mut F,
        memory: &mut M,
    ) -> Result<ImageInfo>
    where
        B: RegisterBus,
        D: DelayNs,
        H: ImageHeaderOps + ?Sized,
        F: FitLoader + ?Sized,
        M: LoadMemory + ?Sized,
    {
        let offset = self.config.load_offset();
        log::debug!(
            "spi boot: {:?} flash, image at {:#x} (own size {:#x}, configured {:#x})",
            self.config.medium,
            offset,
            self.config.own_image_size,
            self.config.image_offset
        );

        let transport = TransportHandle::init(bus, self.target);
        let mut engine = SpiEngine::new(transport, delay, self.config.timing);

        let medium = match self.identify(&mut engine) {
            Ok(medium) => medium,
            Err(e) => {
                engine.shutdown();
                match e {
                    Error::NoChipDetected => {
                        log::error!("Received only zeros on JEDEC ID probe, assuming no device attached")
                    }
                    Error::UnsupportedChip { jedec_id } => log::error!("Unknown chip {:06x}", jedec_id),
                    _ => {}
                }
                return Err(e);
            }
        };

        let mut reader = FlashReader::new(engine, medium);
        let result = self.load_from(&mut reader, offset, headers, fit, memory);
        reader.shutdown();
        result
    }

    fn identify<B: RegisterBus, D: DelayNs>(&self, engine: &mut SpiEngine<B, D>) -> Result<Medium> {
        let id = engine.read_jedec_id(self.config.medium.id_dummy_bytes()) & 0x00FF_FFFF;
        match self.config.medium {
            MediumKind::Nor if id == 0 => Err(Error::NoChipDetected),
            MediumKind::Nor => {
                log::info!("Found SPI NOR flash ({:06x})", id);
                Ok(Medium::Nor)
            }
            MediumKind::Nand => match resolve(id, self.config.allow_generic_nand) {
                Resolution::NoChip => Err(Error::NoChipDetected),
                Resolution::Unknown(jedec_id) => Err(Error::UnsupportedChip { jedec_id }),
                Resolution::Known(g) => {
                    log::info!("Found {}({:06x})", g.name, id);
                    Ok(Medium::Nand(g))
                }
                Resolution::GenericFallback(g) => {
                    log::warn!("Unknown chip {:06x}, using {}", id, g.name);
                    Ok(Medium::Nand(g))
                }
            },
        }
    }

    fn load_from<B, D, H, F, M>(
        &self,
        reader: &mut FlashReader<B, D>,
        offset: u32,
        headers: &H,
        fit: &mut F,
        memory: &mut M,
    ) -> Result<ImageInfo>
    where
        B: RegisterBus,
        D: DelayNs,
        H: ImageHeaderOps + ?Sized,
        F: FitLoader + ?Sized,
        M: LoadMemory + ?Sized,
    {
        let mut header: RawHeader = [0u8; HEADER_SIZE];
        reader.read(offset, &mut header);

        if !headers.check_header(&header) {
            log::error!("Image header CRC error");
            return Err(Error::ChecksumInvalid);
        }

        if self.config.load_fit && is_fit(&header) {
            log::info!("Found FIT image");
            return fit.load_fit(reader, offset, &header);
        }

        let info = headers.parse_header(&header)?;
        let dest = memory.region(info.load_address, info.size)?;
        log::info!(
            "Loading '{}': {:#x} bytes from flash {:#x} to {:#x}",
            info.name(),
            info.size,
            offset,
            info.load_address
        );
        reader.read(offset, dest);
        Ok(info)
    }
}
