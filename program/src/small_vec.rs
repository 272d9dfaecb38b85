//! A `Vec` whose wire form carries a fixed-width length prefix.
//!
//! Borsh writes a `u32` in front of every vector. Vault messages are embedded in
//! another transaction with a hard size ceiling, so account and instruction
//! arrays use a `u8` count and instruction data uses a `u16` count instead.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use std::{
    io::{Error, ErrorKind, Read, Result, Write},
    marker::PhantomData,
    ops::Deref,
};

/// Integer type used as the element count of a [`SmallVec`].
pub trait LengthPrefix: Copy + TryFrom<usize> + Into<usize> + BorshSerialize + BorshDeserialize {
    /// Largest element count the prefix can express.
    const MAX: usize;
}

impl LengthPrefix for u8 {
    const MAX: usize = u8::MAX as usize;
}

impl LengthPrefix for u16 {
    const MAX: usize = u16::MAX as usize;
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SmallVec<L, T>(Vec<T>, #[serde(skip)] PhantomData<L>);

impl<L: LengthPrefix, T> SmallVec<L, T> {
    pub fn new() -> Self {
        Self(Vec::new(), PhantomData)
    }

    /// True when the element count fits the length prefix.
    pub fn fits_prefix(&self) -> bool {
        self.0.len() <= L::MAX
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<L, T> From<Vec<T>> for SmallVec<L, T> {
    fn from(vec: Vec<T>) -> Self {
        Self(vec, PhantomData)
    }
}

impl<L, T> Deref for SmallVec<L, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<L, T> FromIterator<T> for SmallVec<L, T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect(), PhantomData)
    }
}

impl<'a, L, T> IntoIterator for &'a SmallVec<L, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<L: LengthPrefix, T: BorshSerialize> BorshSerialize for SmallVec<L, T> {
    fn serialize<W: Write>(&self, writer: &mut W) -> Result<()> {
        let len = L::try_from(self.0.len()).map_err(|_| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("{} elements exceed the length prefix maximum of {}", self.0.len(), L::MAX),
            )
        })?;
        BorshSerialize::serialize(&len, writer)?;
        for item in &self.0 {
            BorshSerialize::serialize(item, writer)?;
        }
        Ok(())
    }
}

impl<L: LengthPrefix, T: BorshDeserialize> BorshDeserialize for SmallVec<L, T> {
    fn deserialize_reader<R: Read>(reader: &mut R) -> Result<Self> {
        let len: usize = L::deserialize_reader(reader)?.into();
        let mut vec = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(T::deserialize_reader(reader)?);
        }
        Ok(Self(vec, PhantomData))
    }
}
