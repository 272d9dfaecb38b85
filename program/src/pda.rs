//! Program-derived addresses for multisig vaults, vault transactions and
//! ephemeral signers.
//!
//! A program-derived address (PDA) is a hash of seeds and a program id that is
//! guaranteed not to be a valid public key, so nobody holds a private key for
//! it. Vaults and ephemeral signers are PDAs: a compiled message may require
//! their authorization, but they never produce a signature in a transaction.

use crate::pubkey::Pubkey;
use thiserror::Error;

/// Prefix shared by every seed set derived here
pub const SEED_PREFIX: &[u8] = b"multisig";
pub const SEED_VAULT: &[u8] = b"vault";
pub const SEED_TRANSACTION: &[u8] = b"transaction";
pub const SEED_EPHEMERAL_SIGNER: &[u8] = b"ephemeral_signer";

/// Maximum number of seeds allowed in PDA derivation
pub const MAX_SEEDS: usize = 16;
/// Maximum length in bytes for each seed used in PDA derivation
pub const MAX_SEED_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PdaError {
    #[error("length of the seed is too long for address generation")]
    MaxSeedLengthExceeded,
    #[error("provided seeds do not result in a valid address")]
    InvalidSeeds,
    #[error("unable to find a viable program address bump seed")]
    NoViableBump,
}

/// Checks whether the bytes are the x coordinate of a point on secp256k1.
///
/// Derived addresses must fail this check so that no key pair can ever sign
/// for them.
pub fn is_on_curve(bytes: &[u8]) -> bool {
    bitcoin::secp256k1::XOnlyPublicKey::from_slice(bytes).is_ok()
}

impl Pubkey {
    /// Creates a program address deterministically from a set of seeds and a
    /// program id.
    ///
    /// The address is `sha256(seeds || program_id)` and is rejected with
    /// [`PdaError::InvalidSeeds`] when it lies on the curve.
    pub fn create_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<Pubkey, PdaError> {
        if seeds.len() > MAX_SEEDS {
            return Err(PdaError::MaxSeedLengthExceeded);
        }
        if seeds.iter().any(|seed| seed.len() > MAX_SEED_LEN) {
            return Err(PdaError::MaxSeedLengthExceeded);
        }

        let mut hash = vec![];
        for seed in seeds.iter() {
            hash.extend_from_slice(seed);
        }
        hash.extend_from_slice(program_id.as_ref());
        let hash = hex::decode(sha256::digest(&hash)).map_err(|_| PdaError::InvalidSeeds)?;

        if is_on_curve(&hash) {
            return Err(PdaError::InvalidSeeds);
        }

        Pubkey::try_from_bytes(&hash).map_err(|_| PdaError::InvalidSeeds)
    }

    /// Finds a valid program address and bump seed for the given seeds and
    /// program id, trying bump seeds from 255 downwards.
    pub fn try_find_program_address(
        seeds: &[&[u8]],
        program_id: &Pubkey,
    ) -> Result<(Pubkey, u8), PdaError> {
        let mut bump_seed = [u8::MAX];
        for _ in 0..u8::MAX {
            let mut seeds_with_bump = seeds.to_vec();
            seeds_with_bump.push(&bump_seed);
            match Self::create_program_address(&seeds_with_bump, program_id) {
                Ok(address) => return Ok((address, bump_seed[0])),
                Err(PdaError::InvalidSeeds) => (),
                Err(err) => return Err(err),
            }
            bump_seed[0] -= 1;
        }
        Err(PdaError::NoViableBump)
    }
}

/// Derives the address of the vault with the given index for a multisig.
pub fn get_vault_pda(
    multisig: &Pubkey,
    vault_index: u8,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), PdaError> {
    Pubkey::try_find_program_address(
        &[SEED_PREFIX, multisig.as_ref(), SEED_VAULT, &[vault_index]],
        program_id,
    )
}

/// Derives the address of the vault transaction account that stores a
/// compiled message.
pub fn get_transaction_pda(
    multisig: &Pubkey,
    transaction_index: u64,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), PdaError> {
    Pubkey::try_find_program_address(
        &[
            SEED_PREFIX,
            multisig.as_ref(),
            SEED_TRANSACTION,
            &transaction_index.to_le_bytes(),
        ],
        program_id,
    )
}

/// Derives the placeholder address of an ephemeral signer of a vault
/// transaction.
pub fn get_ephemeral_signer_pda(
    transaction: &Pubkey,
    ephemeral_signer_index: u8,
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), PdaError> {
    Pubkey::try_find_program_address(
        &[
            SEED_PREFIX,
            transaction.as_ref(),
            SEED_EPHEMERAL_SIGNER,
            &[ephemeral_signer_index],
        ],
        program_id,
    )
}

/// Derives the first `count` ephemeral signer addresses of a transaction.
pub fn get_ephemeral_signer_pdas(
    transaction: &Pubkey,
    count: u8,
    program_id: &Pubkey,
) -> Result<Vec<Pubkey>, PdaError> {
    (0..count)
        .map(|index| get_ephemeral_signer_pda(transaction, index, program_id).map(|(pda, _)| pda))
        .collect()
}
