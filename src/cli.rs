//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

#[derive(Parser)]
#[command(name = "spiboot")]
#[command(
    author,
    version,
    about = "Run the sunxi SPI flash boot loader against a flash image",
    long_about = None
)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flash kind on SPI0
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumArg {
    /// SPI NOR flash
    Nor,
    /// SPI NAND flash
    Nand,
}

/// Board options shared by the commands that touch the simulated SoC
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BoardArgs {
    /// Flash image file (raw dump starting at flash offset 0)
    pub image: PathBuf,

    /// Board file (TOML format); command-line options take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SoC family (see list-targets)
    #[arg(short, long)]
    pub soc: Option<String>,

    /// Flash kind on SPI0
    #[arg(short, long, value_enum)]
    pub medium: Option<MediumArg>,

    /// 24-bit identifier reported by the simulated flash (e.g., 0xC212C2)
    #[arg(long, value_parser = parse_hex_u32)]
    pub jedec_id: Option<u32>,

    /// Configured flash offset of the next boot stage
    #[arg(long, value_parser = parse_hex_u32)]
    pub offset: Option<u32>,

    /// Size of the running stage as stored in flash
    #[arg(long, value_parser = parse_hex_u32)]
    pub spl_size: Option<u32>,

    /// Treat unknown SPI NAND parts as generic 2 KiB page devices
    #[arg(long)]
    pub generic_nand: bool,

    /// Base address of simulated DRAM
    #[arg(long, value_parser = parse_hex_u32)]
    pub ram_base: Option<u32>,

    /// Size of simulated DRAM in bytes
    #[arg(long, value_parser = parse_hex_u32)]
    pub ram_size: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the next boot stage from a flash image
    Boot {
        #[command(flatten)]
        board: BoardArgs,

        /// Write the loaded stage to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reject FIT containers instead of loading them
        #[arg(long)]
        no_fit: bool,
    },

    /// Identify the flash on SPI0 without loading anything
    Probe {
        #[command(flatten)]
        board: BoardArgs,
    },

    /// List known SPI NAND chips
    ListChips,

    /// List supported SoC families
    ListTargets,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x8000"), Ok(0x8000));
        assert_eq!(parse_hex_u32("0XC212C2"), Ok(0xC212C2));
        assert_eq!(parse_hex_u32("32768"), Ok(32768));
        assert!(parse_hex_u32("0xZZ").is_err());
        assert!(parse_hex_u32("").is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_subcommand_man_pages_render() {
        let mut cmd = Cli::command();
        cmd.build();
        let names: Vec<&str> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        for name in ["boot", "probe", "list-chips", "list-targets"] {
            assert!(names.contains(&name), "{}", name);
        }
        for sub in cmd.get_subcommands().filter(|s| s.get_name() != "help") {
            let mut buffer = Vec::new();
            clap_mangen::Man::new(sub.clone()).render(&mut buffer).unwrap();
            assert!(!buffer.is_empty());
        }
    }

    #[test]
    fn test_parse_boot() {
        let cli = Cli::try_parse_from([
            "spiboot", "-vv", "boot", "flash.bin", "--soc", "h6", "--medium", "nand",
            "--jedec-id", "0xC212C2", "--offset", "0x20000", "-o", "u-boot.bin",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Boot { board, output, no_fit } => {
                assert_eq!(board.image, PathBuf::from("flash.bin"));
                assert_eq!(board.soc.as_deref(), Some("h6"));
                assert_eq!(board.medium, Some(MediumArg::Nand));
                assert_eq!(board.jedec_id, Some(0xC212C2));
                assert_eq!(board.offset, Some(0x20000));
                assert_eq!(output, Some(PathBuf::from("u-boot.bin")));
                assert!(!no_fit);
            }
            _ => panic!("expected boot"),
        }
    }
}
