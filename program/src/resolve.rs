//! Expands a stored [`VaultTransactionMessage`] into the account list needed to
//! execute it.

use crate::{
    account::AccountMeta, address_lookup_table::AddressLookupTableAccount,
    message::VaultTransactionMessage, pubkey::Pubkey,
};
use thiserror::Error;
use tracing::debug;

/// Errors caused by the live state of lookup tables. The stored message is
/// fine; fetching the tables again and retrying may succeed.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ResolveError {
    #[error("address lookup table `{0}` not found")]
    LookupTableNotFound(Pubkey),
    #[error("index {index} is out of range for address lookup table `{table}`")]
    LookupIndexOutOfRange { table: Pubkey, index: u8 },
}

/// Accounts to pass to the execute instruction, and the lookup tables they were
/// loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccounts {
    pub account_metas: Vec<AccountMeta>,
    pub lookup_tables: Vec<AddressLookupTableAccount>,
}

/// Distinct lookup table addresses referenced by a message, in the order they
/// are first referenced.
pub fn lookup_table_keys(message: &VaultTransactionMessage) -> Vec<Pubkey> {
    let mut keys: Vec<Pubkey> = Vec::with_capacity(message.address_table_lookups.len());
    for lookup in &message.address_table_lookups {
        if !keys.contains(&lookup.account_key) {
            keys.push(lookup.account_key);
        }
    }
    keys
}

/// Builds the ordered account metas for executing `message`.
///
/// The list starts with every referenced lookup table (readonly), followed by
/// the static keys, then for each lookup in order its writable looked-up
/// accounts followed by its readonly looked-up accounts. The executing program
/// walks the looked-up accounts lookup by lookup in this same order.
///
/// The vault and the ephemeral signers are PDAs. They keep their position but
/// are never marked as signers: the multisig program signs for them.
pub fn resolve_account_metas(
    message: &VaultTransactionMessage,
    vault: &Pubkey,
    ephemeral_signers: &[Pubkey],
    lookup_tables: &[AddressLookupTableAccount],
) -> Result<ResolvedAccounts, ResolveError> {
    let used_tables = lookup_table_keys(message)
        .into_iter()
        .map(|key| {
            lookup_tables
                .iter()
                .find(|table| table.key == key)
                .cloned()
                .ok_or(ResolveError::LookupTableNotFound(key))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut account_metas = Vec::with_capacity(
        used_tables
            .len()
            .saturating_add(message.num_all_account_keys()),
    );

    account_metas.extend(
        used_tables
            .iter()
            .map(|table| AccountMeta::new_readonly(table.key, false)),
    );

    for (index, key) in message.account_keys.iter().enumerate() {
        let is_pda = key == vault || ephemeral_signers.contains(key);
        account_metas.push(AccountMeta {
            pubkey: *key,
            is_signer: message.is_signer_index(index) && !is_pda,
            is_writable: message.is_static_writable_index(index),
        });
    }

    let find_table = |key: &Pubkey| {
        used_tables
            .iter()
            .find(|table| table.key == *key)
            .ok_or(ResolveError::LookupTableNotFound(*key))
    };
    let load = |table: &AddressLookupTableAccount, index: u8| {
        table
            .get(index)
            .copied()
            .ok_or(ResolveError::LookupIndexOutOfRange {
                table: table.key,
                index,
            })
    };

    for lookup in &message.address_table_lookups {
        let table = find_table(&lookup.account_key)?;
        for index in &lookup.writable_indexes {
            account_metas.push(AccountMeta::new(load(table, *index)?, false));
        }
        for index in &lookup.readonly_indexes {
            account_metas.push(AccountMeta::new_readonly(load(table, *index)?, false));
        }
    }

    debug!(
        accounts = account_metas.len(),
        tables = used_tables.len(),
        "resolved vault transaction accounts"
    );

    Ok(ResolvedAccounts {
        account_metas,
        lookup_tables: used_tables,
    })
}
