//! Async client helpers for vault transaction messages.
//!
//! The compiler and codec in [`vault_message`] are pure. This crate adds the
//! parts that talk to the network: fetching lookup tables, deriving the
//! execution context from a [`ClientConfig`] and resolving the accounts an
//! execute instruction must pass.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod resolver;

pub use config::ClientConfig;
pub use error::{ClientError, FetchError};
pub use fetcher::{AccountDataFetcher, AccountDataLookupTables, InMemoryLookupTables, LookupTableFetcher};
pub use resolver::{
    compile_with_lookup_tables, fetch_lookup_tables, resolve_execute_accounts,
    resolve_message_accounts, ExecuteContext,
};
pub use vault_message;
