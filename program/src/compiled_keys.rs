use {
    crate::{
        address_lookup_table::{AddressLookupTableAccount, LoadedAddresses},
        instruction::Instruction,
        message::{MessageAddressTableLookup, MessageHeader},
        pubkey::Pubkey,
    },
    indexmap::IndexMap,
    thiserror::Error,
    tracing::trace,
};

/// Maximum number of distinct accounts a message can address with one-byte
/// indexes, static and looked-up keys combined.
pub const MAX_ACCOUNT_KEYS: usize = 256;

/// A helper struct to collect pubkeys compiled for a set of instructions.
///
/// Entries keep the order in which they were first referenced; that order, not
/// the byte order of the keys, decides where each key lands in the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledKeys {
    payer: Pubkey,
    key_meta_map: IndexMap<Pubkey, CompiledKeyMeta>,
}

#[derive(PartialEq, Debug, Error, Eq, Clone)]
pub enum CompileError {
    #[error("message references more than {MAX_ACCOUNT_KEYS} account keys")]
    TooManyKeys,
    #[error("message has no writable signer")]
    NoWritableSigner,
    #[error("first writable signer `{found}` is not the payer `{payer}`")]
    PayerNotFirst { payer: Pubkey, found: Pubkey },
    #[error("address lookup table index overflowed during compilation")]
    LookupIndexOverflow,
    #[error("encountered unknown account key `{0}` during instruction compilation")]
    CompilerInvariantViolation(Pubkey),
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompiledKeyMeta {
    pub is_signer: bool,
    pub is_writable: bool,
    /// Never set by this compiler: program ids stay eligible for table lookups.
    pub is_invoked: bool,
}

impl CompiledKeys {
    /// Compiles the pubkeys referenced by a list of instructions and organizes by
    /// signer/non-signer and writable/readonly.
    pub fn compile(instructions: &[Instruction], payer: Pubkey) -> Self {
        let mut key_meta_map = IndexMap::<Pubkey, CompiledKeyMeta>::new();
        key_meta_map.insert(
            payer,
            CompiledKeyMeta {
                is_signer: true,
                is_writable: true,
                is_invoked: false,
            },
        );
        for ix in instructions {
            key_meta_map.entry(ix.program_id).or_default();
            for account_meta in &ix.accounts {
                let meta = key_meta_map.entry(account_meta.pubkey).or_default();
                meta.is_signer |= account_meta.is_signer;
                meta.is_writable |= account_meta.is_writable;
            }
        }
        Self {
            payer,
            key_meta_map,
        }
    }

    pub fn payer(&self) -> &Pubkey {
        &self.payer
    }

    pub fn len(&self) -> usize {
        self.key_meta_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_meta_map.is_empty()
    }

    pub fn get(&self, key: &Pubkey) -> Option<&CompiledKeyMeta> {
        self.key_meta_map.get(key)
    }

    /// Moves every remaining non-signer, non-invoked key found in `lookup_table`
    /// out of the static key set and into a table lookup.
    ///
    /// Returns `None` when the table holds none of the eligible keys.
    pub fn try_extract_table_lookup(
        &mut self,
        lookup_table: &AddressLookupTableAccount,
    ) -> Result<Option<(MessageAddressTableLookup, LoadedAddresses)>, CompileError> {
        let (writable_indexes, writable) = self.try_find_keys_in_lookup_table(
            lookup_table,
            |meta| !meta.is_signer && !meta.is_invoked && meta.is_writable,
        )?;
        let (readonly_indexes, readonly) = self.try_find_keys_in_lookup_table(
            lookup_table,
            |meta| !meta.is_signer && !meta.is_invoked && !meta.is_writable,
        )?;

        // both groups are validated, nothing has left the map yet
        for key in writable.iter().chain(&readonly) {
            self.key_meta_map.shift_remove(key);
        }

        if writable_indexes.is_empty() && readonly_indexes.is_empty() {
            trace!(table = %lookup_table.key, "lookup table holds no eligible keys");
            return Ok(None);
        }

        trace!(
            table = %lookup_table.key,
            writable = writable_indexes.len(),
            readonly = readonly_indexes.len(),
            "extracted table lookup"
        );
        Ok(Some((
            MessageAddressTableLookup {
                account_key: lookup_table.key,
                writable_indexes: writable_indexes.into(),
                readonly_indexes: readonly_indexes.into(),
            },
            LoadedAddresses { writable, readonly },
        )))
    }

    fn try_find_keys_in_lookup_table(
        &self,
        lookup_table: &AddressLookupTableAccount,
        key_meta_filter: impl Fn(&CompiledKeyMeta) -> bool,
    ) -> Result<(Vec<u8>, Vec<Pubkey>), CompileError> {
        let mut lookup_table_indexes = Vec::new();
        let mut found_keys = Vec::new();

        for (key, meta) in self.key_meta_map.iter() {
            if !key_meta_filter(meta) {
                continue;
            }
            if let Some(index) = lookup_table.position(key) {
                let index = u8::try_from(index).map_err(|_| CompileError::LookupIndexOverflow)?;
                lookup_table_indexes.push(index);
                found_keys.push(*key);
            }
        }

        Ok((lookup_table_indexes, found_keys))
    }

    pub fn try_into_message_components(self) -> Result<(MessageHeader, Vec<Pubkey>), CompileError> {
        let try_into_u8 = |num: usize| -> Result<u8, CompileError> {
            u8::try_from(num).map_err(|_| CompileError::TooManyKeys)
        };

        let Self {
            payer,
            key_meta_map,
        } = self;

        if key_meta_map.len() > MAX_ACCOUNT_KEYS {
            return Err(CompileError::TooManyKeys);
        }

        let writable_signer_keys: Vec<Pubkey> = key_meta_map
            .iter()
            .filter_map(|(key, meta)| (meta.is_signer && meta.is_writable).then_some(*key))
            .collect();
        let readonly_signer_keys: Vec<Pubkey> = key_meta_map
            .iter()
            .filter_map(|(key, meta)| (meta.is_signer && !meta.is_writable).then_some(*key))
            .collect();
        let writable_non_signer_keys: Vec<Pubkey> = key_meta_map
            .iter()
            .filter_map(|(key, meta)| (!meta.is_signer && meta.is_writable).then_some(*key))
            .collect();
        let readonly_non_signer_keys: Vec<Pubkey> = key_meta_map
            .iter()
            .filter_map(|(key, meta)| (!meta.is_signer && !meta.is_writable).then_some(*key))
            .collect();

        match writable_signer_keys.first() {
            None => return Err(CompileError::NoWritableSigner),
            Some(first) if *first != payer => {
                return Err(CompileError::PayerNotFirst {
                    payer,
                    found: *first,
                })
            }
            Some(_) => {}
        }

        let signers_len = writable_signer_keys
            .len()
            .saturating_add(readonly_signer_keys.len());

        let header = MessageHeader {
            num_required_signatures: try_into_u8(signers_len)?,
            num_readonly_signed_accounts: try_into_u8(readonly_signer_keys.len())?,
            num_readonly_unsigned_accounts: try_into_u8(readonly_non_signer_keys.len())?,
        };

        let static_account_keys = std::iter::empty()
            .chain(writable_signer_keys)
            .chain(readonly_signer_keys)
            .chain(writable_non_signer_keys)
            .chain(readonly_non_signer_keys)
            .collect();

        Ok((header, static_account_keys))
    }
}
