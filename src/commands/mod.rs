//! Command implementations

pub mod boot;
pub mod list;
pub mod probe;

use std::fs;
use std::path::Path;

use spiboot_sim::{SimDelay, SimFlash, SimSoc};

use crate::config::Board;
use crate::error::{CliError, Result};

/// Build the simulated flash for `board` from a raw image file
pub fn load_flash(board: &Board, image: &Path) -> Result<SimFlash> {
    let data = fs::read(image).map_err(|source| CliError::ReadFile {
        path: image.to_path_buf(),
        source,
    })?;
    let config = board.flash_config(data.len());
    log::info!(
        "Loaded {} bytes from {} into a {:?} flash (ID {:06X})",
        data.len(),
        image.display(),
        config.kind,
        config.jedec_id
    );
    Ok(SimFlash::with_data(config, 0, &data))
}

/// Log what the simulated hardware saw
pub fn report_simulation(soc: &SimSoc, delay: &SimDelay) {
    log::debug!(
        "{} SPI0 bursts, {} flash transactions, {} ns of settle delays",
        soc.spi0().bursts().len(),
        soc.flash().transactions().len(),
        delay.total_ns()
    );
    for v in soc.spi0().violations() {
        log::warn!("SPI0: {}", v);
    }
    for v in soc.flash().violations() {
        log::warn!("Flash: {}", v);
    }
    if soc.teardown_count() != 1 {
        log::warn!("SPI0 was shut down {} times", soc.teardown_count());
    }
}
