//! Known SPI NAND parts
//!
//! All parts supported so far share the 2 KiB page layout. The Winbond
//! W25N01GV only decodes a 16-bit row address.

use super::types::FlashGeometry;

/// Known SPI NAND parts, first match wins
pub static KNOWN_NANDS: &[FlashGeometry] = &[
    // MX35LFxGE4AB repeat the C2x2 pattern over and over again
    FlashGeometry::generic_2k("Macronix MX35LF1GE4AB", 0x00C2_12C2),
    FlashGeometry::generic_2k("Macronix MX35LF2GE4AB", 0x00C2_22C2),
    FlashGeometry::generic_2k("Winbond W25N01GVxxIG", 0x00EF_AA21).with_page_mask(0x0000_FFFF),
    // 3.3 V
    FlashGeometry::generic_2k("GigaDevice GD5F1GQ4RCxxG", 0x00C8_B148),
    // 1.8 V
    FlashGeometry::generic_2k("GigaDevice GD5F1GQ4RCxxG", 0x00C8_A148),
    FlashGeometry::generic_2k("HeYangTek HYF1GQ4U", 0x00C9_51C9),
    FlashGeometry::generic_2k("HeYangTek HYF2GQ4U", 0x00C9_52C9),
    FlashGeometry::generic_2k("HeYangTek HYF4GQ4U", 0x00C9_54C9),
];

/// Geometry used for unknown parts when the generic fallback is enabled
pub static GENERIC_2K: FlashGeometry = FlashGeometry::generic_2k("Generic 2K SPI-NAND", 0x00FF_FFFF);

/// Outcome of an identifier lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The part is in [`KNOWN_NANDS`]
    Known(&'static FlashGeometry),
    /// The part is unknown; the generic geometry is used
    GenericFallback(&'static FlashGeometry),
    /// The part is unknown and the fallback is disabled
    Unknown(u32),
    /// The identifier read back as zero
    NoChip,
}

impl Resolution {
    /// Geometry to read with, if the part can be used
    pub fn geometry(&self) -> Option<&'static FlashGeometry> {
        match self {
            Self::Known(g) | Self::GenericFallback(g) => Some(g),
            Self::Unknown(_) | Self::NoChip => None,
        }
    }
}

/// Find the entry matching `jedec_id` exactly
pub fn find_by_jedec_id(jedec_id: u32) -> Option<&'static FlashGeometry> {
    KNOWN_NANDS.iter().find(|g| g.jedec_id == jedec_id)
}

/// Map a Read ID answer to a geometry
///
/// Only the low 24 bits of `jedec_id` are significant. An all-zero answer
/// means nothing drove MISO and is reported as [`Resolution::NoChip`]
/// regardless of `allow_generic`.
pub fn resolve(jedec_id: u32, allow_generic: bool) -> Resolution {
    let jedec_id = jedec_id & 0x00FF_FFFF;
    if jedec_id == 0 {
        return Resolution::NoChip;
    }
    match find_by_jedec_id(jedec_id) {
        Some(g) => Resolution::Known(g),
        None if allow_generic => Resolution::GenericFallback(&GENERIC_2K),
        None => Resolution::Unknown(jedec_id),
    }
}
