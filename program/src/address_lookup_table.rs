//! Address lookup tables: on-chain arrays of addresses that let a message
//! reference an account by a one-byte index instead of its full 32 bytes.

use crate::pubkey::{Pubkey, PUBKEY_BYTES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Size of the metadata prefix stored in front of the addresses of a lookup
/// table account.
pub const LOOKUP_TABLE_META_SIZE: usize = 56;

/// Maximum number of addresses a lookup table may hold.
pub const LOOKUP_TABLE_MAX_ADDRESSES: usize = 256;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LookupTableError {
    #[error("lookup table account data is shorter than its metadata")]
    MetadataTooShort,
    #[error("lookup table account data has a trailing partial address")]
    InvalidAccountData,
}

/// A lookup table together with its current contents.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct AddressLookupTableAccount {
    pub key: Pubkey,
    pub addresses: Vec<Pubkey>,
}

impl AddressLookupTableAccount {
    pub fn new(key: Pubkey, addresses: Vec<Pubkey>) -> Self {
        Self { key, addresses }
    }

    /// Parses the raw data of a lookup table account.
    ///
    /// The metadata prefix is skipped; everything after it must be a whole
    /// number of 32-byte addresses.
    pub fn deserialize(key: Pubkey, data: &[u8]) -> Result<Self, LookupTableError> {
        let raw_addresses = data
            .get(LOOKUP_TABLE_META_SIZE..)
            .ok_or(LookupTableError::MetadataTooShort)?;
        if raw_addresses.len() % PUBKEY_BYTES != 0 {
            return Err(LookupTableError::InvalidAccountData);
        }

        let addresses = raw_addresses
            .chunks_exact(PUBKEY_BYTES)
            .map(Pubkey::try_from_bytes)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| LookupTableError::InvalidAccountData)?;

        Ok(Self { key, addresses })
    }

    /// Index of the first occurrence of `key` in the table.
    pub fn position(&self, key: &Pubkey) -> Option<usize> {
        self.addresses.iter().position(|address| address == key)
    }

    /// Address stored at `index`, if the table is that long.
    pub fn get(&self, index: u8) -> Option<&Pubkey> {
        self.addresses.get(usize::from(index))
    }
}

/// Addresses pulled out of the static key list and into table lookups, in the
/// order they occupy in the combined index space.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct LoadedAddresses {
    pub writable: Vec<Pubkey>,
    pub readonly: Vec<Pubkey>,
}

impl LoadedAddresses {
    pub fn len(&self) -> usize {
        self.writable.len().saturating_add(self.readonly.len())
    }

    pub fn is_empty(&self) -> bool {
        self.writable.is_empty() && self.readonly.is_empty()
    }
}

impl FromIterator<LoadedAddresses> for LoadedAddresses {
    fn from_iter<T: IntoIterator<Item = LoadedAddresses>>(iter: T) -> Self {
        let (writable, readonly): (Vec<Vec<Pubkey>>, Vec<Vec<Pubkey>>) = iter
            .into_iter()
            .map(|addresses| (addresses.writable, addresses.readonly))
            .unzip();
        LoadedAddresses {
            writable: writable.into_iter().flatten().collect(),
            readonly: readonly.into_iter().flatten().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_account_data(addresses: &[Pubkey]) -> Vec<u8> {
        let mut data = vec![0u8; LOOKUP_TABLE_META_SIZE];
        data[0] = 1;
        for address in addresses {
            data.extend_from_slice(address.as_ref());
        }
        data
    }

    #[test]
    fn test_deserialize_account_data() {
        let key = Pubkey::new_unique();
        let addresses = vec![Pubkey::new_unique(), Pubkey::new_unique()];

        let table =
            AddressLookupTableAccount::deserialize(key, &table_account_data(&addresses)).unwrap();
        assert_eq!(table, AddressLookupTableAccount::new(key, addresses));
    }

    #[test]
    fn test_deserialize_empty_table() {
        let key = Pubkey::new_unique();
        let table = AddressLookupTableAccount::deserialize(key, &table_account_data(&[])).unwrap();
        assert!(table.addresses.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_bad_data() {
        let key = Pubkey::new_unique();
        assert_eq!(
            AddressLookupTableAccount::deserialize(key, &[0u8; LOOKUP_TABLE_META_SIZE - 1]),
            Err(LookupTableError::MetadataTooShort)
        );

        let mut data = table_account_data(&[Pubkey::new_unique()]);
        data.push(9);
        assert_eq!(
            AddressLookupTableAccount::deserialize(key, &data),
            Err(LookupTableError::InvalidAccountData)
        );
    }

    #[test]
    fn test_position_returns_first_occurrence() {
        let dup = Pubkey::new_unique();
        let table = AddressLookupTableAccount::new(
            Pubkey::new_unique(),
            vec![Pubkey::new_unique(), dup, dup],
        );
        assert_eq!(table.position(&dup), Some(1));
        assert_eq!(table.get(2), Some(&dup));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn test_loaded_addresses_concatenate_by_group() {
        let (w0, r0, w1, r1) = (
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        let combined: LoadedAddresses = vec![
            LoadedAddresses {
                writable: vec![w0],
                readonly: vec![r0],
            },
            LoadedAddresses {
                writable: vec![w1],
                readonly: vec![r1],
            },
        ]
        .into_iter()
        .collect();

        assert_eq!(combined.writable, vec![w0, w1]);
        assert_eq!(combined.readonly, vec![r0, r1]);
        assert_eq!(combined.len(), 4);
    }
}
