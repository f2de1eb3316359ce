//! Board settings
//!
//! A board is described by an optional TOML file and by command-line
//! options. Options given on the command line win over the file, and
//! anything given by neither falls back to the defaults below.
//!
//! ```toml
//! soc = "h6"
//! medium = "nand"
//! jedec_id = 0xC212C2
//! offset = 0x20000
//!
//! [timing]
//! nand_poll_ns = 500
//! ```

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Deserialize;
use spiboot_core::chip::MediumKind;
use spiboot_core::loader::BootConfig;
use spiboot_core::protocol::Timing;
use spiboot_core::target::SocTarget;
use spiboot_sim::{FlashConfig, FlashKind};

use crate::cli::{BoardArgs, MediumArg};
use crate::error::{CliError, Result};

/// Default flash offset of the next boot stage
pub const DEFAULT_OFFSET: u32 = 0x8000;
/// Default simulated DRAM base
pub const DEFAULT_RAM_BASE: u32 = 0x4000_0000;
/// Default simulated DRAM size
pub const DEFAULT_RAM_SIZE: u32 = 64 * 1024 * 1024;
/// Identifier of the simulated NOR part when none is given
pub const DEFAULT_NOR_ID: u32 = 0x00EF_4018;
/// Identifier of the simulated NAND part when none is given
pub const DEFAULT_NAND_ID: u32 = 0x00C2_12C2;

/// Board file contents
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardFile {
    pub soc: Option<String>,
    pub medium: Option<String>,
    pub jedec_id: Option<u32>,
    pub offset: Option<u32>,
    pub spl_size: Option<u32>,
    pub generic_nand: Option<bool>,
    pub ram_base: Option<u32>,
    pub ram_size: Option<u32>,
    #[serde(default)]
    pub timing: TimingFile,
}

/// `[timing]` table of the board file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingFile {
    pub cs_recovery_ns: Option<u32>,
    pub nand_poll_ns: Option<u32>,
    pub nor_read_recovery_ns: Option<u32>,
}

impl BoardFile {
    /// Parse a board file
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Read and parse a board file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Fully resolved board settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub target: SocTarget,
    pub medium: MediumKind,
    pub jedec_id: u32,
    pub offset: u32,
    pub spl_size: u32,
    pub generic_nand: bool,
    pub ram_base: u32,
    pub ram_size: u32,
    pub timing: Timing,
}

impl Board {
    /// Resolve the board from the command line, reading `--config` if given
    pub fn from_args(args: &BoardArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                log::debug!("Reading board file {}", path.display());
                BoardFile::load(path)?
            }
            None => BoardFile::default(),
        };
        Self::merge(args, file)
    }

    /// Combine command-line options with a board file
    pub fn merge(args: &BoardArgs, file: BoardFile) -> Result<Self> {
        let soc = args
            .soc
            .as_deref()
            .or(file.soc.as_deref())
            .ok_or(CliError::MissingTarget)?;
        let target = SocTarget::from_key(soc).ok_or_else(|| CliError::UnknownTarget(soc.into()))?;

        let medium = match (args.medium, file.medium.as_deref()) {
            (Some(m), _) => m,
            (None, Some(name)) => {
                MediumArg::from_str(name, true).map_err(|_| CliError::UnknownMedium(name.into()))?
            }
            (None, None) => MediumArg::Nor,
        };
        let medium = match medium {
            MediumArg::Nor => MediumKind::Nor,
            MediumArg::Nand => MediumKind::Nand,
        };

        let default_id = match medium {
            MediumKind::Nor => DEFAULT_NOR_ID,
            MediumKind::Nand => DEFAULT_NAND_ID,
        };

        let defaults = Timing::default();
        let timing = Timing {
            cs_recovery_ns: file.timing.cs_recovery_ns.unwrap_or(defaults.cs_recovery_ns),
            nand_poll_ns: file.timing.nand_poll_ns.unwrap_or(defaults.nand_poll_ns),
            nor_read_recovery_ns: file
                .timing
                .nor_read_recovery_ns
                .unwrap_or(defaults.nor_read_recovery_ns),
        };

        Ok(Self {
            target,
            medium,
            jedec_id: args.jedec_id.or(file.jedec_id).unwrap_or(default_id),
            offset: args.offset.or(file.offset).unwrap_or(DEFAULT_OFFSET),
            spl_size: args.spl_size.or(file.spl_size).unwrap_or(0),
            generic_nand: args.generic_nand || file.generic_nand.unwrap_or(false),
            ram_base: args.ram_base.or(file.ram_base).unwrap_or(DEFAULT_RAM_BASE),
            ram_size: args.ram_size.or(file.ram_size).unwrap_or(DEFAULT_RAM_SIZE),
            timing,
        })
    }

    /// Loader configuration for this board
    pub fn boot_config(&self, load_fit: bool) -> BootConfig {
        let mut config = match self.medium {
            MediumKind::Nor => BootConfig::nor(self.spl_size, self.offset),
            MediumKind::Nand => BootConfig::nand(self.spl_size, self.offset),
        };
        config.allow_generic_nand = self.generic_nand;
        config.load_fit = load_fit;
        config.timing = self.timing;
        config
    }

    /// Simulated flash able to hold `image_len` bytes
    ///
    /// A zero identifier models an empty socket.
    pub fn flash_config(&self, image_len: usize) -> FlashConfig {
        if self.jedec_id == 0 {
            return FlashConfig::absent();
        }
        let mut config = match self.medium {
            MediumKind::Nor => FlashConfig::nor(),
            MediumKind::Nand => FlashConfig::nand(self.jedec_id),
        };
        config.jedec_id = self.jedec_id;
        // NAND reads run up to the end of the page holding the last byte
        let granule = match config.kind {
            FlashKind::Nand { page_shift, .. } => 1usize << page_shift,
            _ => 1,
        };
        config.size = config.size.max(image_len.next_multiple_of(granule));
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(soc: Option<&str>) -> BoardArgs {
        BoardArgs {
            image: PathBuf::from("flash.bin"),
            soc: soc.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let board = Board::merge(&args(Some("sun50i")), BoardFile::default()).unwrap();
        assert_eq!(board.target, SocTarget::Sun50i);
        assert_eq!(board.medium, MediumKind::Nor);
        assert_eq!(board.jedec_id, DEFAULT_NOR_ID);
        assert_eq!(board.offset, DEFAULT_OFFSET);
        assert_eq!(board.timing, Timing::default());
        assert_eq!(board.boot_config(true).load_offset(), DEFAULT_OFFSET);
    }

    #[test]
    fn test_flags_override_file() {
        let file = BoardFile::parse(
            r#"
            soc = "h6"
            medium = "nand"
            jedec_id = 0xEFAA21
            offset = 0x20000
            generic_nand = true

            [timing]
            nand_poll_ns = 500
            "#,
        )
        .unwrap();
        let mut cli = args(Some("t113"));
        cli.offset = Some(0x40000);

        let board = Board::merge(&cli, file).unwrap();
        assert_eq!(board.target, SocTarget::Sun8iT113);
        assert_eq!(board.medium, MediumKind::Nand);
        assert_eq!(board.jedec_id, 0xEFAA21);
        assert_eq!(board.offset, 0x40000);
        assert!(board.generic_nand);
        assert_eq!(board.timing.nand_poll_ns, 500);
        assert_eq!(board.timing.cs_recovery_ns, Timing::default().cs_recovery_ns);

        let config = board.boot_config(false);
        assert_eq!(config.medium, MediumKind::Nand);
        assert!(config.allow_generic_nand);
        assert!(!config.load_fit);
    }

    #[test]
    fn test_missing_and_unknown_target() {
        assert!(matches!(
            Board::merge(&args(None), BoardFile::default()),
            Err(CliError::MissingTarget)
        ));
        assert!(matches!(
            Board::merge(&args(Some("sun99i")), BoardFile::default()),
            Err(CliError::UnknownTarget(_))
        ));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(BoardFile::parse("soc = \"h6\"\nflash = \"nor\"\n").is_err());
    }

    #[test]
    fn test_unknown_medium() {
        let file = BoardFile::parse("medium = \"emmc\"\n").unwrap();
        assert!(matches!(
            Board::merge(&args(Some("h6")), file),
            Err(CliError::UnknownMedium(_))
        ));
    }

    #[test]
    fn test_flash_config_fits_image() {
        let mut board = Board::merge(&args(Some("h6")), BoardFile::default()).unwrap();
        board.medium = MediumKind::Nand;
        board.jedec_id = DEFAULT_NAND_ID;
        let config = board.flash_config(32 * 1024 * 1024 + 1);
        assert_eq!(config.size, 32 * 1024 * 1024 + 2048);
        assert_eq!(config.jedec_id, DEFAULT_NAND_ID);

        board.jedec_id = 0;
        assert_eq!(board.flash_config(16).kind, FlashKind::Absent);
    }
}
