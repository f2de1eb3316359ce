//! Boot command implementation

use std::fs;
use std::path::Path;

use spiboot_core::image::{ImageInfo, LegacyImage, RawHeader, HEADER_SIZE};
use spiboot_core::loader::{BootLoader, FitLoader, LoadSource};
use spiboot_core::Error;
use spiboot_sim::{SimDelay, SimMemory, SimSoc};

use crate::config::Board;
use crate::error::{CliError, Result};

/// Largest FIT container the host tool copies out
pub const FIT_MAX_SIZE: u32 = 64 * 1024 * 1024;

/// FIT loader that copies the whole container out of flash
///
/// The container size comes from the `totalsize` field of the flattened
/// device tree header. Nothing inside the container is interpreted.
#[derive(Debug, Default)]
pub struct FitDump {
    blob: Option<Vec<u8>>,
}

impl FitDump {
    /// The container read by the last successful load
    pub fn take(&mut self) -> Option<Vec<u8>> {
        self.blob.take()
    }
}

/// `totalsize` field of a flattened device tree header
fn fdt_total_size(header: &RawHeader) -> u32 {
    u32::from_be_bytes([header[4], header[5], header[6], header[7]])
}

impl FitLoader for FitDump {
    fn load_fit(
        &mut self,
        source: &mut dyn LoadSource,
        offset: u32,
        header: &RawHeader,
    ) -> spiboot_core::Result<ImageInfo> {
        let total = fdt_total_size(header);
        if total < HEADER_SIZE as u32 || total > FIT_MAX_SIZE {
            log::error!("FIT totalsize {:#x} out of range", total);
            return Err(Error::FitLoadFailed);
        }
        log::info!("Copying FIT container of {} bytes at {:#x}", total, offset);

        let mut blob = vec![0u8; total as usize];
        let count = total / source.block_len();
        let read = source.read(offset, count, &mut blob);
        if read != count {
            log::error!("Short FIT read: {} of {} blocks", read, count);
            return Err(Error::FitLoadFailed);
        }

        self.blob = Some(blob);
        Ok(ImageInfo::new(0, 0, total, "FIT"))
    }
}

/// Run the loader against the flash image and optionally save the result
pub fn run_boot(board: &Board, image: &Path, output: Option<&Path>, load_fit: bool) -> Result<()> {
    let flash = super::load_flash(board, image)?;
    let desc = board.target.descriptor();
    let mut soc = SimSoc::new(desc, flash);
    let mut delay = SimDelay::new();
    let mut memory = SimMemory::new(board.ram_base, board.ram_size as usize);
    let mut fit = FitDump::default();

    let loader = BootLoader::new(desc, board.boot_config(load_fit));
    log::info!(
        "Booting {} from SPI {:?}, next stage at {:#x}",
        desc.name,
        board.medium,
        loader.config().load_offset()
    );

    let result = loader.load(&mut soc, &mut delay, &LegacyImage, &mut fit, &mut memory);
    super::report_simulation(&soc, &delay);
    let info = result?;

    let data = match fit.take() {
        Some(blob) => {
            println!("Loaded FIT container ({} bytes)", info.size);
            blob
        }
        None => {
            println!("Loaded '{}'", info.name());
            println!("  Load address: {:#010x}", info.load_address);
            println!("  Entry point:  {:#010x}", info.entry_point);
            println!("  Size:         {} bytes", info.size);
            memory
                .slice(info.load_address, info.size as usize)
                .ok_or(Error::AddressOutOfRange)?
                .to_vec()
        }
    };

    if let Some(path) = output {
        fs::write(path, &data).map_err(|source| CliError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        println!("Wrote {} bytes to {}", data.len(), path.display());
    }

    Ok(())
}
