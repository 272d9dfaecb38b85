use crate::{error::ClientError, fetcher::LookupTableFetcher};
use futures::future::try_join_all;
use tracing::{debug, warn};
use vault_message::{
    address_lookup_table::AddressLookupTableAccount,
    instruction::Instruction,
    pda::get_ephemeral_signer_pdas,
    pubkey::Pubkey,
    resolve::{lookup_table_keys, resolve_account_metas, ResolvedAccounts},
    ResolveError, VaultTransactionMessage,
};

/// Everything besides the message that execution needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteContext {
    pub program_id: Pubkey,
    /// The vault transaction account storing the message
    pub transaction: Pubkey,
    pub vault: Pubkey,
    pub ephemeral_signer_count: u8,
}

/// Fetches each table once, concurrently, preserving the order of `keys`.
///
/// A table that does not exist fails the whole batch.
pub async fn fetch_lookup_tables<F: LookupTableFetcher + ?Sized>(
    fetcher: &F,
    keys: &[Pubkey],
) -> Result<Vec<AddressLookupTableAccount>, ClientError> {
    try_join_all(keys.iter().map(|key| async move {
        match fetcher.fetch_lookup_table(key).await? {
            Some(table) => Ok(table),
            None => {
                warn!(table = %key, "address lookup table not found");
                Err(ClientError::from(ResolveError::LookupTableNotFound(*key)))
            }
        }
    }))
    .await
}

/// Compiles instructions against tables fetched from the network. Tables keep
/// the order of `lookup_table_keys`, which decides which table claims a key
/// held by several of them.
pub async fn compile_with_lookup_tables<F: LookupTableFetcher + ?Sized>(
    vault: &Pubkey,
    instructions: &[Instruction],
    lookup_table_keys: &[Pubkey],
    fetcher: &F,
) -> Result<VaultTransactionMessage, ClientError> {
    let lookup_tables = fetch_lookup_tables(fetcher, lookup_table_keys).await?;
    Ok(VaultTransactionMessage::try_compile(
        vault,
        instructions,
        &lookup_tables,
    )?)
}

/// Decodes stored message bytes and resolves the accounts needed to execute
/// them.
pub async fn resolve_execute_accounts<F: LookupTableFetcher + ?Sized>(
    message_bytes: &[u8],
    context: &ExecuteContext,
    fetcher: &F,
) -> Result<ResolvedAccounts, ClientError> {
    let message = VaultTransactionMessage::deserialize(message_bytes)?;
    resolve_message_accounts(&message, context, fetcher).await
}

/// Resolves the accounts needed to execute an already decoded message.
pub async fn resolve_message_accounts<F: LookupTableFetcher + ?Sized>(
    message: &VaultTransactionMessage,
    context: &ExecuteContext,
    fetcher: &F,
) -> Result<ResolvedAccounts, ClientError> {
    let ephemeral_signers = get_ephemeral_signer_pdas(
        &context.transaction,
        context.ephemeral_signer_count,
        &context.program_id,
    )?;

    let table_keys = lookup_table_keys(message);
    debug!(
        tables = table_keys.len(),
        ephemeral_signers = ephemeral_signers.len(),
        "fetching lookup tables for execution"
    );
    let lookup_tables = fetch_lookup_tables(fetcher, &table_keys).await?;

    Ok(resolve_account_metas(
        message,
        &context.vault,
        &ephemeral_signers,
        &lookup_tables,
    )?)
}
