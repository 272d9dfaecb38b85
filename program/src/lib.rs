/*!
# Vault Message
Compiler and compact codec for the transaction messages a multisig stores and
later executes through one of its vaults.

A client compiles instructions into a [`VaultTransactionMessage`]: accounts are
ordered canonically with the vault first, accounts found in the supplied address
lookup tables are replaced by one-byte table indexes, and the result is encoded
with one-byte array counts (two bytes for instruction data). At execution time
the stored bytes are decoded and expanded back into the full account list.

```rust,ignore
use vault_message::{instruction::Instruction, message::VaultTransactionMessage};

let message = VaultTransactionMessage::try_compile(&vault, &instructions, &lookup_tables)?;
let bytes = message.serialize()?;
```

[`VaultTransactionMessage`]: message::VaultTransactionMessage
*/

/// Account metadata describing signer and writable roles
pub mod account;
/// Address lookup table contents and account data parsing
pub mod address_lookup_table;
/// Per-key metadata collection, canonical ordering and table extraction
pub mod compiled_keys;
/// Instruction definitions
pub mod instruction;
/// The compact vault transaction message and its codec
pub mod message;
/// Program-derived addresses for vaults, transactions and ephemeral signers
pub mod pda;
/// Public key definitions and operations
pub mod pubkey;
/// Execution account list reconstruction
pub mod resolve;
/// Sanitization trait and error types for validating decoded messages
pub mod sanitize;
/// Length-prefixed vectors used by the compact codec
pub mod small_vec;

pub use {
    compiled_keys::CompileError,
    message::{DecodeError, EncodeError, VaultTransactionMessage},
    resolve::ResolveError,
};
