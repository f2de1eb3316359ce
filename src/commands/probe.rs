//! Probe command implementation

use std::path::Path;

use spiboot_core::chip::{resolve, MediumKind, Resolution};
use spiboot_core::protocol::SpiEngine;
use spiboot_core::transport::TransportHandle;
use spiboot_core::Error;
use spiboot_sim::{SimDelay, SimSoc};

use crate::config::Board;
use crate::error::Result;

/// Bring up SPI0, read the flash identifier and report it
pub fn run_probe(board: &Board, image: &Path) -> Result<()> {
    let flash = super::load_flash(board, image)?;
    let desc = board.target.descriptor();
    let mut soc = SimSoc::new(desc, flash);
    let mut delay = SimDelay::new();

    let transport = TransportHandle::init(&mut soc, desc);
    let mut engine = SpiEngine::new(transport, &mut delay, board.timing);
    let id = engine.read_jedec_id(board.medium.id_dummy_bytes());
    engine.shutdown();

    super::report_simulation(&soc, &delay);

    println!(
        "Controller: {} ({}) at {:#010x}",
        desc.name, desc.variant, desc.spi0_base
    );

    match board.medium {
        MediumKind::Nor => {
            if id == 0 {
                return Err(Error::NoChipDetected.into());
            }
            println!("Found SPI NOR flash, JEDEC ID {:06X}", id);
        }
        MediumKind::Nand => match resolve(id, board.generic_nand) {
            Resolution::Known(g) => {
                println!("Found {} (JEDEC ID {:06X})", g.name, id);
                println!("  Page size: {} bytes", g.page_size());
            }
            Resolution::GenericFallback(g) => {
                println!("Found unknown SPI NAND {:06X}, using {}", id, g.name);
                println!("  Page size: {} bytes", g.page_size());
            }
            Resolution::Unknown(jedec_id) => return Err(Error::UnsupportedChip { jedec_id }.into()),
            Resolution::NoChip => return Err(Error::NoChipDetected.into()),
        },
    }

    Ok(())
}
