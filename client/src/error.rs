use crate::config::ConfigError;
use thiserror::Error;
use vault_message::{
    address_lookup_table::LookupTableError, pda::PdaError, CompileError, DecodeError,
    ResolveError,
};

/// A network collaborator failed to answer a fetch.
#[derive(Debug, Error)]
#[error("fetch failed: {0}")]
pub struct FetchError(pub Box<dyn std::error::Error + Send + Sync>);

impl FetchError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Compile(#[from] CompileError),
    #[error("{0}")]
    Decode(#[from] DecodeError),
    #[error("{0}")]
    Resolve(#[from] ResolveError),
    #[error("{0}")]
    Fetch(#[from] FetchError),
    #[error("invalid lookup table account: {0}")]
    LookupTable(#[from] LookupTableError),
    #[error("address derivation failed: {0}")]
    Pda(#[from] PdaError),
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// True for failures caused by live network state; fetching again and
    /// retrying may succeed. Compile and decode errors never go away on retry.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ClientError::Resolve(_) | ClientError::Fetch(_) | ClientError::LookupTable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_message::pubkey::Pubkey;

    #[test]
    fn test_is_retriable() {
        assert!(ClientError::from(ResolveError::LookupTableNotFound(Pubkey::new_unique()))
            .is_retriable());
        assert!(ClientError::from(FetchError::new("connection reset")).is_retriable());
        assert!(!ClientError::from(CompileError::TooManyKeys).is_retriable());
        assert!(
            !ClientError::from(DecodeError::from(std::io::Error::from(
                std::io::ErrorKind::UnexpectedEof
            )))
            .is_retriable()
        );
    }
}
