//! List commands implementation

use spiboot_core::chip::{GENERIC_2K, KNOWN_NANDS};
use spiboot_core::target::SocTarget;

/// List all known SPI NAND chips
pub fn list_chips() {
    println!("Known SPI NAND chips:");
    println!();
    println!(
        "{:<22} {:>8} {:>10} {:>10}",
        "Name", "JEDEC ID", "Page size", "Row mask"
    );
    println!("{}", "-".repeat(53));

    for chip in KNOWN_NANDS {
        println!(
            "{:<22} {:>8} {:>10} {:>#10x}",
            chip.name,
            format!("{:06X}", chip.jedec_id),
            format_size(chip.page_size()),
            chip.page_mask
        );
    }

    println!();
    println!(
        "Unknown parts use the {} geometry ({} pages) with --generic-nand.",
        GENERIC_2K.name,
        format_size(GENERIC_2K.page_size())
    );
    println!("SPI NOR parts need no table entry.");
}

/// List all supported SoC families
pub fn list_targets() {
    println!("Supported SoC families:");
    println!();
    println!(
        "{:<8} {:<10} {:<6} {:>10}  {}",
        "Key", "Family", "SPI0", "Base", "Pins"
    );
    println!("{}", "-".repeat(60));

    for target in SocTarget::ALL {
        let desc = target.descriptor();
        let pins: Vec<String> = desc.pins.iter().map(|p| p.to_string()).collect();
        println!(
            "{:<8} {:<10} {:<6} {:>#10x}  {}",
            target.key(),
            desc.name,
            desc.variant.to_string(),
            desc.spi0_base,
            pins.join(",")
        );
    }
}

fn format_size(bytes: u32) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}
