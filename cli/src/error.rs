use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Message bytes are not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("No vault given and none could be derived from the config: {0}")]
    MissingVault(String),
}
