//! Error types for the spiboot host tool

use std::path::PathBuf;
use thiserror::Error;

/// Host tool errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to read an input file
    #[error("Failed to read '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write an output file
    #[error("Failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Board file is not valid TOML or has unknown keys
    #[error("Invalid board file '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Neither the command line nor the board file names a SoC
    #[error("No SoC given. Use --soc or set `soc` in the board file")]
    MissingTarget,

    /// SoC name not in the target table
    #[error("Unknown SoC '{0}'. Use list-targets to see the supported ones")]
    UnknownTarget(String),

    /// Board file names an unknown flash kind
    #[error("Unknown flash medium '{0}', expected 'nor' or 'nand'")]
    UnknownMedium(String),

    /// The loader failed
    #[error("Boot failed: {0}")]
    Boot(#[from] spiboot_core::Error),
}

/// Result type for host tool operations
pub type Result<T> = std::result::Result<T, CliError>;
