use crate::{
    address_lookup_table::{AddressLookupTableAccount, LoadedAddresses},
    compiled_keys::{CompileError, CompiledKeys, MAX_ACCOUNT_KEYS},
    instruction::Instruction,
    pubkey::Pubkey,
    sanitize::{Sanitize, SanitizeError},
    small_vec::SmallVec,
};
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// The header of a compiled message, as produced by the key compiler.
///
/// Only the stored counts of [`VaultTransactionMessage`] reach the wire; this
/// struct is the conventional form the counts are derived from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MessageHeader {
    /// The number of signatures required for this message to be considered
    /// valid
    pub num_required_signatures: u8,

    /// The last `num_readonly_signed_accounts` of the signed keys are read-only
    /// accounts.
    pub num_readonly_signed_accounts: u8,

    /// The last `num_readonly_unsigned_accounts` of the unsigned keys are
    /// read-only accounts.
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction whose program and accounts are indexes into the combined
/// key space of a [`VaultTransactionMessage`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct CompiledInstruction {
    /// Index of the program account that processes this instruction
    pub program_id_index: u8,
    /// Ordered indexes of the accounts passed to the program
    pub account_indexes: SmallVec<u8, u8>,
    /// The program-specific instruction data
    pub data: SmallVec<u16, u8>,
}

/// A reference to accounts stored in an address lookup table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct MessageAddressTableLookup {
    /// Address of the lookup table account
    pub account_key: Pubkey,
    /// Indexes into the table of the accounts loaded as writable
    pub writable_indexes: SmallVec<u8, u8>,
    /// Indexes into the table of the accounts loaded as readonly
    pub readonly_indexes: SmallVec<u8, u8>,
}

/// The compact message a multisig stores for later execution by its vault.
///
/// Static account keys are laid out as writable signers, readonly signers,
/// writable non-signers and readonly non-signers. Only three counts are kept;
/// the readonly counts are derived from them and the number of static keys.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VaultTransactionMessage {
    /// The number of signer pubkeys in the account_keys vec
    pub num_signers: u8,
    /// The number of writable signer pubkeys in the account_keys vec
    pub num_writable_signers: u8,
    /// The number of writable non-signer pubkeys in the account_keys vec
    pub num_writable_non_signers: u8,
    /// Unique static account keys, the vault first
    pub account_keys: SmallVec<u8, Pubkey>,
    pub instructions: SmallVec<u8, CompiledInstruction>,
    pub address_table_lookups: SmallVec<u8, MessageAddressTableLookup>,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EncodeError {
    #[error("{field} holds {len} elements, more than the {max} its length prefix allows")]
    LengthOverflow {
        field: &'static str,
        len: usize,
        max: usize,
    },
    #[error("failed to encode message: {0}")]
    Io(String),
}

/// A stored message could not be read back. This signals a storage or version
/// mismatch rather than a caller mistake.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("corrupt message: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt message: {0}")]
    Sanitize(#[from] SanitizeError),
}

impl VaultTransactionMessage {
    /// Compiles instructions into a message executed by `vault`.
    ///
    /// Lookup tables are tried in the order given; a key eligible for several
    /// tables is claimed by the first one that holds it.
    pub fn try_compile(
        vault: &Pubkey,
        instructions: &[Instruction],
        address_lookup_table_accounts: &[AddressLookupTableAccount],
    ) -> Result<Self, CompileError> {
        let mut compiled_keys = CompiledKeys::compile(instructions, *vault);

        let mut address_table_lookups = Vec::with_capacity(address_lookup_table_accounts.len());
        let mut loaded_addresses_list = Vec::with_capacity(address_lookup_table_accounts.len());
        for lookup_table_account in address_lookup_table_accounts {
            if let Some((lookup, loaded_addresses)) =
                compiled_keys.try_extract_table_lookup(lookup_table_account)?
            {
                address_table_lookups.push(lookup);
                loaded_addresses_list.push(loaded_addresses);
            }
        }

        let (header, static_keys) = compiled_keys.try_into_message_components()?;
        let dynamic_keys: LoadedAddresses = loaded_addresses_list.into_iter().collect();
        if static_keys.len().saturating_add(dynamic_keys.len()) > MAX_ACCOUNT_KEYS {
            return Err(CompileError::TooManyKeys);
        }

        let account_index_map = combined_account_index_map(&static_keys, &dynamic_keys);
        let instructions = compile_instructions(instructions, &account_index_map)?;

        let num_writable_non_signers = static_keys
            .len()
            .saturating_sub(usize::from(header.num_required_signatures))
            .saturating_sub(usize::from(header.num_readonly_unsigned_accounts));

        debug!(
            static_keys = static_keys.len(),
            loaded_writable = dynamic_keys.writable.len(),
            loaded_readonly = dynamic_keys.readonly.len(),
            lookups = address_table_lookups.len(),
            "compiled vault transaction message"
        );

        Ok(Self {
            num_signers: header.num_required_signatures,
            num_writable_signers: header
                .num_required_signatures
                .saturating_sub(header.num_readonly_signed_accounts),
            num_writable_non_signers: u8::try_from(num_writable_non_signers)
                .map_err(|_| CompileError::TooManyKeys)?,
            account_keys: static_keys.into(),
            instructions: instructions.into(),
            address_table_lookups: address_table_lookups.into(),
        })
    }

    /// Encodes the message in its compact wire layout.
    pub fn serialize(&self) -> Result<Vec<u8>, EncodeError> {
        self.check_lengths()?;
        borsh::to_vec(self).map_err(|err| EncodeError::Io(err.to_string()))
    }

    /// Decodes a message from its compact wire layout and checks that the
    /// stored counts are consistent.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let message = borsh::from_slice::<Self>(bytes)?;
        message.sanitize()?;
        Ok(message)
    }

    fn check_lengths(&self) -> Result<(), EncodeError> {
        fn check<L: crate::small_vec::LengthPrefix, T>(
            field: &'static str,
            small_vec: &SmallVec<L, T>,
        ) -> Result<(), EncodeError> {
            if small_vec.fits_prefix() {
                Ok(())
            } else {
                Err(EncodeError::LengthOverflow {
                    field,
                    len: small_vec.len(),
                    max: L::MAX,
                })
            }
        }

        check("account_keys", &self.account_keys)?;
        check("instructions", &self.instructions)?;
        check("address_table_lookups", &self.address_table_lookups)?;
        for ix in &self.instructions {
            check("account_indexes", &ix.account_indexes)?;
            check("data", &ix.data)?;
        }
        for lookup in &self.address_table_lookups {
            check("writable_indexes", &lookup.writable_indexes)?;
            check("readonly_indexes", &lookup.readonly_indexes)?;
        }
        Ok(())
    }

    pub fn num_readonly_signers(&self) -> usize {
        usize::from(self.num_signers).saturating_sub(usize::from(self.num_writable_signers))
    }

    pub fn num_readonly_non_signers(&self) -> usize {
        self.account_keys
            .len()
            .saturating_sub(usize::from(self.num_signers))
            .saturating_sub(usize::from(self.num_writable_non_signers))
    }

    /// Number of keys in the combined index space: static keys plus every
    /// looked-up key.
    pub fn num_all_account_keys(&self) -> usize {
        let num_lookup_keys: usize = self
            .address_table_lookups
            .iter()
            .map(|lookup| lookup.writable_indexes.len() + lookup.readonly_indexes.len())
            .sum();
        self.account_keys.len().saturating_add(num_lookup_keys)
    }

    /// Returns true if the static key at `index` requires the authorization of
    /// a signer.
    pub fn is_signer_index(&self, index: usize) -> bool {
        index < usize::from(self.num_signers)
    }

    /// Returns true if the static key at `index` is writable.
    pub fn is_static_writable_index(&self, index: usize) -> bool {
        let num_signers = usize::from(self.num_signers);
        if index >= self.account_keys.len() {
            false
        } else if index < usize::from(self.num_writable_signers) {
            true
        } else if index >= num_signers {
            index - num_signers < usize::from(self.num_writable_non_signers)
        } else {
            false
        }
    }
}

impl Sanitize for VaultTransactionMessage {
    fn sanitize(&self) -> Result<(), SanitizeError> {
        // writable signers are a subset of the signers
        if self.num_writable_signers > self.num_signers {
            return Err(SanitizeError::ValueOutOfBounds);
        }

        // signing area and writable non-signing area should fit the static keys
        if usize::from(self.num_signers) + usize::from(self.num_writable_non_signers)
            > self.account_keys.len()
        {
            return Err(SanitizeError::ValueOutOfBounds);
        }

        let mut unique_keys = HashSet::new();
        for key in &self.account_keys {
            if !unique_keys.insert(key) {
                return Err(SanitizeError::DuplicateAccount);
            }
        }

        let num_all_account_keys = self.num_all_account_keys();
        if num_all_account_keys > MAX_ACCOUNT_KEYS {
            return Err(SanitizeError::ValueOutOfBounds);
        }
        for ci in &self.instructions {
            if usize::from(ci.program_id_index) >= num_all_account_keys {
                return Err(SanitizeError::IndexOutOfBounds);
            }
            for ai in &ci.account_indexes {
                if usize::from(*ai) >= num_all_account_keys {
                    return Err(SanitizeError::IndexOutOfBounds);
                }
            }
        }
        Ok(())
    }
}

/// Numbers every key of the message: static keys first, then all writable
/// looked-up keys, then all readonly looked-up keys. This is the order in which
/// lookups are loaded at execution time.
fn combined_account_index_map<'a>(
    static_keys: &'a [Pubkey],
    dynamic_keys: &'a LoadedAddresses,
) -> BTreeMap<&'a Pubkey, u8> {
    static_keys
        .iter()
        .chain(&dynamic_keys.writable)
        .chain(&dynamic_keys.readonly)
        .enumerate()
        .map(|(index, key)| (key, index as u8))
        .collect()
}

fn position(account_index_map: &BTreeMap<&Pubkey, u8>, key: &Pubkey) -> Result<u8, CompileError> {
    account_index_map
        .get(key)
        .copied()
        .ok_or(CompileError::CompilerInvariantViolation(*key))
}

fn compile_instruction(
    ix: &Instruction,
    account_index_map: &BTreeMap<&Pubkey, u8>,
) -> Result<CompiledInstruction, CompileError> {
    let account_indexes = ix
        .accounts
        .iter()
        .map(|account_meta| position(account_index_map, &account_meta.pubkey))
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(CompiledInstruction {
        program_id_index: position(account_index_map, &ix.program_id)?,
        account_indexes: account_indexes.into(),
        data: ix.data.clone().into(),
    })
}

fn compile_instructions(
    ixs: &[Instruction],
    account_index_map: &BTreeMap<&Pubkey, u8>,
) -> Result<Vec<CompiledInstruction>, CompileError> {
    ixs.iter()
        .map(|ix| compile_instruction(ix, account_index_map))
        .collect()
}
