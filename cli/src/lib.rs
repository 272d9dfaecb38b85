use crate::error::CliError;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, io::Write, path::Path, path::PathBuf};
use tracing::{debug, info};
use vault_message::{
    account::AccountMeta,
    address_lookup_table::AddressLookupTableAccount,
    instruction::Instruction,
    pda::{get_ephemeral_signer_pdas, get_transaction_pda},
    pubkey::Pubkey,
    CompileError, VaultTransactionMessage,
};
use vault_message_client::{
    config::CONFIG_FILE_NAME, resolve_execute_accounts, ClientConfig, ExecuteContext,
    InMemoryLookupTables,
};

pub mod error;

#[derive(Debug, Parser)]
#[clap(
    name = "vault-message",
    about = "Compile, decode and resolve multisig vault transaction messages",
    version
)]
pub struct Cli {
    /// Path to the config file. A missing file means defaults.
    #[clap(long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,
    /// Overrides the program id from the config
    #[clap(long, global = true, env = "VAULT_MESSAGE_PROGRAM_ID")]
    pub program_id: Option<Pubkey>,
    /// Overrides the multisig from the config
    #[clap(long, global = true)]
    pub multisig: Option<Pubkey>,
    /// Overrides the vault index from the config
    #[clap(long, global = true)]
    pub vault_index: Option<u8>,
    /// Log at debug level unless RUST_LOG says otherwise
    #[clap(short, long, global = true)]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[clap(about = "Compile instructions into hex encoded message bytes")]
    Compile {
        /// JSON file with the instructions, in order
        #[clap(long)]
        instructions: PathBuf,
        /// JSON file with the lookup tables to try, in priority order
        #[clap(long)]
        tables: Option<PathBuf>,
        /// Vault address, derived from the config when omitted
        #[clap(long)]
        vault: Option<Pubkey>,
    },
    #[clap(about = "Decode hex encoded message bytes into JSON")]
    Decode {
        /// Hex encoded message, with or without a 0x prefix
        message: String,
    },
    #[clap(about = "List the accounts needed to execute a stored message")]
    Resolve {
        /// Hex encoded message, with or without a 0x prefix
        message: String,
        /// JSON file with the current contents of the referenced lookup tables
        #[clap(long)]
        tables: Option<PathBuf>,
        /// Index of the vault transaction, used to derive its address
        #[clap(long, required_unless_present = "transaction")]
        transaction_index: Option<u64>,
        /// Address of the vault transaction, conflicts with `transaction_index`
        #[clap(long, conflicts_with = "transaction_index")]
        transaction: Option<Pubkey>,
        #[clap(long, default_value_t = 0)]
        ephemeral_signers: u8,
        /// Vault address, derived from the config when omitted
        #[clap(long)]
        vault: Option<Pubkey>,
    },
    #[clap(about = "Print the vault, transaction and ephemeral signer addresses")]
    Derive {
        #[clap(long)]
        transaction_index: Option<u64>,
        /// Number of ephemeral signers to derive; needs `transaction_index`
        #[clap(long, default_value_t = 0, requires = "transaction_index")]
        ephemeral_signers: u8,
    },
}

/// Inputs of a single compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub vault: Pubkey,
    pub instructions: Vec<Instruction>,
    pub lookup_tables: Vec<AddressLookupTableAccount>,
}

impl CompileRequest {
    pub fn compile(&self) -> Result<VaultTransactionMessage, CompileError> {
        VaultTransactionMessage::try_compile(&self.vault, &self.instructions, &self.lookup_tables)
    }
}

#[derive(Debug, Serialize)]
struct ResolveOutput {
    account_metas: Vec<AccountMeta>,
    lookup_tables: Vec<Pubkey>,
}

#[derive(Debug, Serialize)]
struct DeriveOutput {
    program_id: Pubkey,
    multisig: Pubkey,
    vault: Pubkey,
    #[serde(skip_serializing_if = "Option::is_none")]
    transaction: Option<Pubkey>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ephemeral_signers: Vec<Pubkey>,
}

impl Cli {
    /// Loads the config file and applies the command line overrides.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::load(&self.config)?;
        if let Some(program_id) = self.program_id {
            config.program_id = program_id;
        }
        if let Some(multisig) = self.multisig {
            config.multisig = Some(multisig);
        }
        if let Some(vault_index) = self.vault_index {
            config.vault_index = vault_index;
        }
        Ok(config)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

fn read_tables(path: Option<&Path>) -> Result<Vec<AddressLookupTableAccount>, CliError> {
    path.map_or_else(|| Ok(vec![]), read_json)
}

fn decode_hex(message: &str) -> Result<Vec<u8>, CliError> {
    let message = message.trim();
    Ok(hex::decode(message.strip_prefix("0x").unwrap_or(message))?)
}

fn vault_or_config(vault: Option<Pubkey>, config: &ClientConfig) -> Result<Pubkey> {
    match vault {
        Some(vault) => Ok(vault),
        None => config
            .vault()
            .map_err(|err| CliError::MissingVault(err.to_string()).into()),
    }
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub async fn entry(opts: Cli, out: &mut impl Write) -> Result<()> {
    let config = opts.client_config()?;
    debug!(?config, "loaded config");

    match opts.command {
        Commands::Compile {
            instructions,
            tables,
            vault,
        } => {
            let request = CompileRequest {
                vault: vault_or_config(vault, &config)?,
                instructions: read_json(&instructions)?,
                lookup_tables: read_tables(tables.as_deref())?,
            };
            let message = request.compile().context("Failed to compile instructions")?;
            let bytes = message.serialize()?;
            info!(
                len = bytes.len(),
                static_keys = message.account_keys.len(),
                lookups = message.address_table_lookups.len(),
                "compiled vault transaction message"
            );
            writeln!(out, "{}", hex::encode(bytes))?;
        }
        Commands::Decode { message } => {
            let message = VaultTransactionMessage::deserialize(&decode_hex(&message)?)
                .context("Failed to decode message")?;
            write_json(out, &message)?;
        }
        Commands::Resolve {
            message,
            tables,
            transaction_index,
            transaction,
            ephemeral_signers,
            vault,
        } => {
            let transaction = match (transaction, transaction_index) {
                (Some(transaction), _) => transaction,
                (None, Some(index)) => config.transaction(index)?,
                (None, None) => anyhow::bail!("Either --transaction or --transaction-index is required"),
            };
            let context = ExecuteContext {
                program_id: config.program_id,
                transaction,
                vault: vault_or_config(vault, &config)?,
                ephemeral_signer_count: ephemeral_signers,
            };
            let fetcher: InMemoryLookupTables = read_tables(tables.as_deref())?.into_iter().collect();

            let resolved = resolve_execute_accounts(&decode_hex(&message)?, &context, &fetcher)
                .await
                .context("Failed to resolve execution accounts")?;
            write_json(
                out,
                &ResolveOutput {
                    account_metas: resolved.account_metas,
                    lookup_tables: resolved.lookup_tables.iter().map(|table| table.key).collect(),
                },
            )?;
        }
        Commands::Derive {
            transaction_index,
            ephemeral_signers,
        } => {
            let multisig = config.multisig()?;
            let transaction = transaction_index
                .map(|index| get_transaction_pda(&multisig, index, &config.program_id))
                .transpose()?
                .map(|(pda, _)| pda);
            let ephemeral_signers = match transaction {
                Some(transaction) => {
                    get_ephemeral_signer_pdas(&transaction, ephemeral_signers, &config.program_id)?
                }
                None => vec![],
            };
            write_json(
                out,
                &DeriveOutput {
                    program_id: config.program_id,
                    multisig,
                    vault: config.vault()?,
                    transaction,
                    ephemeral_signers,
                },
            )?;
        }
    }
    Ok(())
}
