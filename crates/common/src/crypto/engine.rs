//! Authenticated file encryption using AES-256-CBC with encrypt-then-MAC

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::vault_key::VaultKey;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// Size of the per-file key-derivation salt in bytes
pub const SALT_SIZE: usize = 16;
/// Size of the CBC initialization vector in bytes (one AES block)
pub const IV_SIZE: usize = 16;
/// Size of the truncated HMAC-SHA256 authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Tag mismatch or malformed padding. The two cases are deliberately
    /// indistinguishable to the caller.
    #[error("integrity check failed")]
    Integrity,
    #[error("crypto error: {0}")]
    Default(#[from] anyhow::Error),
}

/// The cryptographic fields produced by one encrypt call
///
/// `salt` and `iv` are random and unique per file; they are stored alongside
/// the ciphertext and are not secret. `tag` authenticates
/// `salt || iv || ciphertext` and is verified before any decryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    pub salt: [u8; SALT_SIZE],
    pub iv: [u8; IV_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

impl VaultKey {
    /// Encrypt a plaintext payload under this vault key
    ///
    /// A fresh random salt and IV are generated on every call; the per-file
    /// cipher and MAC keys are derived from `(master, salt)`. The plaintext
    /// is PKCS7-padded to the AES block size, so the ciphertext is always
    /// the next block multiple above the plaintext length.
    ///
    /// # Errors
    ///
    /// Returns an error only on system RNG failure.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedPayload, CryptoError> {
        let mut salt = [0u8; SALT_SIZE];
        getrandom::getrandom(&mut salt)
            .map_err(|e| anyhow::anyhow!("failed to generate salt: {}", e))?;
        let mut iv = [0u8; IV_SIZE];
        getrandom::getrandom(&mut iv)
            .map_err(|e| anyhow::anyhow!("failed to generate iv: {}", e))?;

        let keys = self.derive_file_keys(&salt);

        let ciphertext = Aes256CbcEnc::new((&*keys.cipher_key).into(), (&iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let tag = compute_tag(&*keys.mac_key, &salt, &iv, &ciphertext);

        Ok(EncryptedPayload {
            salt,
            iv,
            tag,
            ciphertext,
        })
    }

    /// Decrypt an encrypted payload under this vault key
    ///
    /// The authentication tag is verified in constant time before any block
    /// is decrypted. Any tampering with the salt, iv, ciphertext, or tag
    /// fails with [`CryptoError::Integrity`], as does malformed padding; no
    /// partial plaintext is ever returned.
    pub fn decrypt(&self, payload: &EncryptedPayload) -> Result<Vec<u8>, CryptoError> {
        let keys = self.derive_file_keys(&payload.salt);

        let mut mac = HmacSha256::new_from_slice(&*keys.mac_key)
            .expect("HMAC can take key of any size");
        mac.update(&payload.salt);
        mac.update(&payload.iv);
        mac.update(&payload.ciphertext);
        mac.verify_truncated_left(&payload.tag)
            .map_err(|_| CryptoError::Integrity)?;

        let plaintext = Aes256CbcDec::new((&*keys.cipher_key).into(), (&payload.iv).into())
            .decrypt_padded_vec_mut::<Pkcs7>(&payload.ciphertext)
            .map_err(|_| CryptoError::Integrity)?;

        Ok(plaintext)
    }
}

fn compute_tag(mac_key: &[u8], salt: &[u8], iv: &[u8], ciphertext: &[u8]) -> [u8; TAG_SIZE] {
    let mut mac = HmacSha256::new_from_slice(mac_key).expect("HMAC can take key of any size");
    mac.update(salt);
    mac.update(iv);
    mac.update(ciphertext);
    let full = mac.finalize().into_bytes();

    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&full[..TAG_SIZE]);
    tag
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = VaultKey::generate();
        let data = b"hello world, this is a test message for encryption";

        let payload = key.encrypt(data).unwrap();
        let decrypted = key.decrypt(&payload).unwrap();

        assert_eq!(data.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_empty_plaintext() {
        let key = VaultKey::generate();

        let payload = key.encrypt(b"").unwrap();
        // PKCS7 always pads, so even empty input produces one full block
        assert_eq!(payload.ciphertext.len(), 16);
        assert_eq!(key.decrypt(&payload).unwrap(), b"");
    }

    #[test]
    fn test_block_aligned_plaintext_gains_a_padding_block() {
        let key = VaultKey::generate();
        let data = vec![0xAB; 1200];

        let payload = key.encrypt(&data).unwrap();
        assert_eq!(payload.ciphertext.len(), 1216);
        assert_eq!(key.decrypt(&payload).unwrap(), data);
    }

    #[test]
    fn test_salt_and_iv_are_fresh_per_call() {
        let key = VaultKey::generate();
        let data = b"identical plaintext";

        let a = key.encrypt(data).unwrap();
        let b = key.encrypt(data).unwrap();

        assert_ne!((a.salt, a.iv), (b.salt, b.iv));
        // fresh salt means a fresh derived key, so ciphertexts differ too
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_ciphertext_bit_flip_fails_integrity() {
        let key = VaultKey::generate();
        let mut payload = key.encrypt(b"some moderately sized plaintext payload").unwrap();

        for pos in [0, 7, payload.ciphertext.len() - 1] {
            payload.ciphertext[pos] ^= 0x01;
            assert!(matches!(
                key.decrypt(&payload),
                Err(CryptoError::Integrity)
            ));
            payload.ciphertext[pos] ^= 0x01;
        }

        // untouched payload still decrypts
        assert!(key.decrypt(&payload).is_ok());
    }

    #[test]
    fn test_tag_bit_flip_fails_integrity() {
        let key = VaultKey::generate();
        let mut payload = key.encrypt(b"tag tamper target").unwrap();

        for pos in 0..TAG_SIZE {
            payload.tag[pos] ^= 0x80;
            assert!(matches!(
                key.decrypt(&payload),
                Err(CryptoError::Integrity)
            ));
            payload.tag[pos] ^= 0x80;
        }
    }

    #[test]
    fn test_salt_and_iv_are_authenticated() {
        let key = VaultKey::generate();
        let mut payload = key.encrypt(b"bound fields").unwrap();

        payload.salt[0] ^= 0xFF;
        assert!(matches!(key.decrypt(&payload), Err(CryptoError::Integrity)));
        payload.salt[0] ^= 0xFF;

        payload.iv[0] ^= 0xFF;
        assert!(matches!(key.decrypt(&payload), Err(CryptoError::Integrity)));
    }

    #[test]
    fn test_wrong_key_fails_integrity() {
        let key = VaultKey::generate();
        let other = VaultKey::generate();

        let payload = key.encrypt(b"for your eyes only").unwrap();
        assert!(matches!(other.decrypt(&payload), Err(CryptoError::Integrity)));
    }
}
