//! Network collaborators that supply live lookup table contents.

use crate::error::{ClientError, FetchError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use vault_message::{address_lookup_table::AddressLookupTableAccount, pubkey::Pubkey};

/// Fetches the current contents of an address lookup table.
///
/// `Ok(None)` means the table does not exist. Implementations should not retry;
/// retry and timeout policy belong to the caller.
#[async_trait]
pub trait LookupTableFetcher: Send + Sync {
    async fn fetch_lookup_table(
        &self,
        key: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, ClientError>;
}

/// Fetches raw account data, as an RPC client would.
#[async_trait]
pub trait AccountDataFetcher: Send + Sync {
    async fn fetch_account_data(&self, key: &Pubkey) -> Result<Option<Vec<u8>>, FetchError>;
}

/// Reads lookup tables by parsing the raw data of their accounts.
pub struct AccountDataLookupTables<F> {
    inner: F,
}

impl<F: AccountDataFetcher> AccountDataLookupTables<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<F: AccountDataFetcher> LookupTableFetcher for AccountDataLookupTables<F> {
    async fn fetch_lookup_table(
        &self,
        key: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, ClientError> {
        match self.inner.fetch_account_data(key).await? {
            Some(data) => Ok(Some(AddressLookupTableAccount::deserialize(*key, &data)?)),
            None => Ok(None),
        }
    }
}

/// Lookup tables held in memory, for tests and offline use.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLookupTables {
    tables: BTreeMap<Pubkey, Vec<Pubkey>>,
}

impl InMemoryLookupTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: AddressLookupTableAccount) {
        self.tables.insert(table.key, table.addresses);
    }
}

impl FromIterator<AddressLookupTableAccount> for InMemoryLookupTables {
    fn from_iter<T: IntoIterator<Item = AddressLookupTableAccount>>(iter: T) -> Self {
        let mut tables = Self::new();
        for table in iter {
            tables.insert(table);
        }
        tables
    }
}

#[async_trait]
impl LookupTableFetcher for InMemoryLookupTables {
    async fn fetch_lookup_table(
        &self,
        key: &Pubkey,
    ) -> Result<Option<AddressLookupTableAccount>, ClientError> {
        Ok(self
            .tables
            .get(key)
            .map(|addresses| AddressLookupTableAccount::new(*key, addresses.clone())))
    }
}
