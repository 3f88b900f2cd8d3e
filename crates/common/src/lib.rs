/**
 * Cryptographic types and operations.
 *  - Vault master key and per-file key derivation
 *  - Authenticated encrypt/decrypt of file payloads
 */
pub mod crypto;
/**
 * The `.ssv` container envelope.
 * Serializes the cryptographic fields of an encrypted
 *  file into a portable binary layout and parses it back.
 */
pub mod container;
/**
 * Extension-based preview classification.
 * A rendering hint only, never a security boundary.
 */
pub mod mime_class;
/**
 * Authenticated identities and their roles.
 */
pub mod principal;

pub mod prelude {
    pub use crate::container::{Container, ContainerError};
    pub use crate::crypto::{CryptoError, EncryptedPayload, VaultKey};
    pub use crate::mime_class::MimeClass;
    pub use crate::principal::{Principal, Role};
}
