use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};
use thiserror::Error;
use vault_message::{
    pda::{get_transaction_pda, get_vault_pda},
    pubkey::Pubkey,
};

/// Placeholder program id used when the config names none. It is not a
/// deployed program; set `program_id` to derive real vault addresses.
pub const DEFAULT_PROGRAM_ID: Pubkey = Pubkey::new_from_array(*b"vault-message-placeholder-progid");

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "VaultMessage.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config has no multisig address")]
    MissingMultisig,
}

/// Which multisig and vault the client works against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub program_id: Pubkey,
    pub multisig: Option<Pubkey>,
    pub vault_index: u8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            multisig: None,
            vault_index: 0,
        }
    }
}

impl FromStr for ClientConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl ClientConfig {
    /// Loads the config at `path`. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        contents.parse()
    }

    pub fn multisig(&self) -> Result<Pubkey, ConfigError> {
        self.multisig.ok_or(ConfigError::MissingMultisig)
    }

    /// Address of the configured vault.
    pub fn vault(&self) -> Result<Pubkey, crate::ClientError> {
        let multisig = self.multisig()?;
        Ok(get_vault_pda(&multisig, self.vault_index, &self.program_id)?.0)
    }

    /// Address of the vault transaction with the given index.
    pub fn transaction(&self, transaction_index: u64) -> Result<Pubkey, crate::ClientError> {
        let multisig = self.multisig()?;
        Ok(get_transaction_pda(&multisig, transaction_index, &self.program_id)?.0)
    }
}
