//! Cryptographic primitives for the SSV vault
//!
//! This module provides the cryptographic foundation for the vault's
//! security model:
//!
//! - **Master key**: a single 256-bit vault-wide secret (`VaultKey`)
//! - **Per-file keys**: derived from the master secret and a per-file salt
//!   via PBKDF2-HMAC-SHA256, so the raw secret never keys a cipher directly
//! - **Encryption**: AES-256-CBC with PKCS7 padding, authenticated with an
//!   encrypt-then-MAC HMAC-SHA256 tag over `salt || iv || ciphertext`
//!
//! # Security Model
//!
//! ## Freshness
//! Every encrypt call generates a fresh random salt and IV. Reusing either
//! under the same derived key leaks plaintext structure in CBC mode, so
//! regeneration is mandatory, not optional.
//!
//! ## Fail-closed decryption
//! The MAC tag is verified (in constant time) before any block is
//! decrypted. Tag mismatch and malformed padding surface as the same
//! `CryptoError::Integrity` so callers cannot be used as a padding oracle,
//! and no partial plaintext is ever returned.

mod engine;
mod vault_key;

pub use engine::{CryptoError, EncryptedPayload, IV_SIZE, SALT_SIZE, TAG_SIZE};
pub use vault_key::{KeyError, VaultKey, VAULT_KEY_SIZE};
