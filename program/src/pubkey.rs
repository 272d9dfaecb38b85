//! Public key definitions and operations.
//!
//! This module defines the `Pubkey` type, a 32-byte address used throughout the
//! message compiler for accounts, programs, vaults and lookup tables. Text form is
//! base58, matching how addresses are shown by wallets and explorers.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of bytes in a pubkey
pub const PUBKEY_BYTES: usize = 32;

/// A 32-byte address identifying an account, a program or a lookup table.
///
/// The wire codec writes a `Pubkey` as its raw 32 bytes with no length prefix.
#[repr(C)]
#[derive(
    Clone,
    Eq,
    PartialEq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Copy,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Pubkey(pub [u8; PUBKEY_BYTES]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePubkeyError {
    #[error("invalid base58 string for pubkey")]
    Invalid,
    #[error("invalid length for pubkey: expected 32 bytes, got {0}")]
    WrongSize(usize),
}

impl Pubkey {
    pub const fn new_from_array(data: [u8; PUBKEY_BYTES]) -> Self {
        Self(data)
    }

    /// Returns the raw 32 key bytes.
    pub fn to_bytes(self) -> [u8; PUBKEY_BYTES] {
        self.0
    }

    /// Creates a Pubkey from a byte slice of exactly 32 bytes.
    pub fn try_from_bytes(data: &[u8]) -> Result<Self, ParsePubkeyError> {
        <[u8; PUBKEY_BYTES]>::try_from(data)
            .map(Self)
            .map_err(|_| ParsePubkeyError::WrongSize(data.len()))
    }

    /// Creates a unique Pubkey for tests and benchmarks.
    ///
    /// Keys come from an incrementing counter, so a more recent key always compares
    /// greater than an older one. Compilation never relies on that ordering.
    pub fn new_unique() -> Self {
        static I: AtomicU64 = AtomicU64::new(1);

        let mut b = [0u8; PUBKEY_BYTES];
        let i = I.fetch_add(1, Ordering::Relaxed);
        // use big endian representation to ensure that recent unique pubkeys
        // are always greater than less recent unique pubkeys
        b[0..8].copy_from_slice(&i.to_be_bytes());
        Self::from(b)
    }
}

impl std::fmt::LowerHex for Pubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for ch in &self.0[..] {
            write!(f, "{:02x}", *ch)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Pubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl std::fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

impl AsRef<[u8]> for Pubkey {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl AsMut<[u8]> for Pubkey {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.0[..]
    }
}

impl From<[u8; PUBKEY_BYTES]> for Pubkey {
    fn from(value: [u8; PUBKEY_BYTES]) -> Self {
        Pubkey(value)
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            Serialize::serialize(&self.0, serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = <String as Deserialize>::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; PUBKEY_BYTES] as Deserialize>::deserialize(deserializer).map(Self)
        }
    }
}

impl std::str::FromStr for Pubkey {
    type Err = ParsePubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| ParsePubkeyError::Invalid)?;
        Self::try_from_bytes(&bytes)
    }
}
