//! The vault-wide master secret and per-file key derivation

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Size of the vault master key in bytes (256 bits)
pub const VAULT_KEY_SIZE: usize = 32;
/// Size of a derived cipher or MAC key in bytes
pub(crate) const DERIVED_KEY_SIZE: usize = 32;
/// PBKDF2 iteration count for per-file key derivation
const PBKDF2_ROUNDS: u32 = 100_000;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
}

/// The 256-bit vault-wide master secret
///
/// The master key never encrypts anything directly. Each file gets its own
/// cipher and MAC keys derived from `(master, salt)` via
/// PBKDF2-HMAC-SHA256, so rotating a file's salt changes its effective key.
/// The key material is zeroed on drop.
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; VAULT_KEY_SIZE]);

impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VaultKey(..)")
    }
}

impl From<[u8; VAULT_KEY_SIZE]> for VaultKey {
    fn from(bytes: [u8; VAULT_KEY_SIZE]) -> Self {
        VaultKey(bytes)
    }
}

/// Per-file key material derived from the master secret and a salt.
/// Split into independent cipher and MAC halves; both zeroed on drop.
pub(crate) struct FileKeys {
    pub cipher_key: Zeroizing<[u8; DERIVED_KEY_SIZE]>,
    pub mac_key: Zeroizing<[u8; DERIVED_KEY_SIZE]>,
}

impl VaultKey {
    /// Generate a new random master key using a cryptographically secure RNG
    pub fn generate() -> Self {
        let mut buff = [0; VAULT_KEY_SIZE];
        getrandom::getrandom(&mut buff).expect("failed to generate random bytes");
        Self(buff)
    }

    /// Create a master key from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `VAULT_KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, KeyError> {
        if data.len() != VAULT_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid key size, expected {}, got {}",
                VAULT_KEY_SIZE,
                data.len()
            )
            .into());
        }
        let mut buff = [0; VAULT_KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Parse a master key from a hexadecimal string
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.trim();
        let mut buff = [0; VAULT_KEY_SIZE];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|_| anyhow::anyhow!("vault key hex decode error"))?;
        Ok(buff.into())
    }

    /// Convert the master key to a hexadecimal string for on-disk storage
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get a reference to the master key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Derive the per-file cipher and MAC keys for a given salt
    pub(crate) fn derive_file_keys(&self, salt: &[u8]) -> FileKeys {
        let mut okm = Zeroizing::new([0u8; DERIVED_KEY_SIZE * 2]);
        pbkdf2_hmac::<Sha256>(self.bytes(), salt, PBKDF2_ROUNDS, &mut okm[..]);

        let mut cipher_key = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
        cipher_key.copy_from_slice(&okm[..DERIVED_KEY_SIZE]);
        let mut mac_key = Zeroizing::new([0u8; DERIVED_KEY_SIZE]);
        mac_key.copy_from_slice(&okm[DERIVED_KEY_SIZE..]);

        FileKeys {
            cipher_key,
            mac_key,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_size_validation() {
        let too_short = [1u8; 16];
        let too_long = [1u8; 64];

        assert!(VaultKey::from_slice(&too_short).is_err());
        assert!(VaultKey::from_slice(&too_long).is_err());

        let just_right = [1u8; VAULT_KEY_SIZE];
        assert!(VaultKey::from_slice(&just_right).is_ok());
    }

    #[test]
    fn test_hex_roundtrip() {
        let key = VaultKey::generate();
        let hex = key.to_hex();
        let recovered = VaultKey::from_hex(&hex).unwrap();
        assert_eq!(key, recovered);
    }

    #[test]
    fn test_hex_rejects_garbage() {
        assert!(VaultKey::from_hex("not hex at all").is_err());
        assert!(VaultKey::from_hex("deadbeef").is_err());
    }

    #[test]
    fn test_derived_keys_depend_on_salt() {
        let key = VaultKey::generate();
        let a = key.derive_file_keys(b"salt-a");
        let b = key.derive_file_keys(b"salt-b");
        assert_ne!(*a.cipher_key, *b.cipher_key);
        assert_ne!(*a.mac_key, *b.mac_key);
        // cipher and MAC halves are independent
        assert_ne!(*a.cipher_key, *a.mac_key);
    }
}
