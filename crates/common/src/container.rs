//! The `.ssv` container envelope
//!
//! A container is the portable serialized form of one encrypted file:
//!
//! ```text
//! magic        4 bytes   "SSV1"
//! version      1 byte
//! saltLen      2 bytes (big-endian)   + salt bytes
//! ivLen        2 bytes (big-endian)   + iv bytes
//! tagLen       2 bytes (big-endian)   + tag bytes
//! ciphertext   remainder of buffer
//! ```
//!
//! Decoding only extracts fields. It validates the magic bytes and version
//! before touching anything else, and it never decrypts; decryption is a
//! separate explicit step so that format failures and integrity failures
//! stay distinguishable to internal callers.

use crate::crypto::{EncryptedPayload, IV_SIZE, SALT_SIZE, TAG_SIZE};

/// Magic bytes at the start of every container
pub const MAGIC: [u8; 4] = *b"SSV1";
/// The container format version this build reads and writes
pub const FORMAT_VERSION: u8 = 1;
/// Fixed header length: magic + version byte
const HEADER_SIZE: usize = MAGIC.len() + 1;

/// Errors that can occur while encoding or parsing a container
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Structurally invalid bytes: bad magic, truncation, or a field length
    /// that doesn't match what the cipher suite expects.
    #[error("malformed container: {0}")]
    Malformed(String),

    /// The magic matched but the version byte is one we don't understand.
    #[error("unsupported container format version: {0}")]
    UnsupportedFormat(u8),
}

/// The parsed fields of a `.ssv` container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub version: u8,
    pub salt: Vec<u8>,
    pub iv: Vec<u8>,
    pub tag: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl From<EncryptedPayload> for Container {
    fn from(payload: EncryptedPayload) -> Self {
        Container {
            version: FORMAT_VERSION,
            salt: payload.salt.to_vec(),
            iv: payload.iv.to_vec(),
            tag: payload.tag.to_vec(),
            ciphertext: payload.ciphertext,
        }
    }
}

impl Container {
    /// Serialize the container into the portable byte layout
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            HEADER_SIZE + 6 + self.salt.len() + self.iv.len() + self.tag.len()
                + self.ciphertext.len(),
        );
        out.extend_from_slice(&MAGIC);
        out.push(self.version);
        for field in [&self.salt, &self.iv, &self.tag] {
            let len = u16::try_from(field.len()).expect("container field fits a u16 prefix");
            out.extend_from_slice(&len.to_be_bytes());
            out.extend_from_slice(field);
        }
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse a container from raw bytes
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Malformed`] on bad magic or truncation and
    /// [`ContainerError::UnsupportedFormat`] on an unknown version byte.
    pub fn decode(bytes: &[u8]) -> Result<Self, ContainerError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ContainerError::Malformed(
                "shorter than the fixed header".into(),
            ));
        }
        if bytes[..MAGIC.len()] != MAGIC {
            return Err(ContainerError::Malformed("bad magic bytes".into()));
        }
        let version = bytes[MAGIC.len()];
        if version != FORMAT_VERSION {
            return Err(ContainerError::UnsupportedFormat(version));
        }

        let mut rest = &bytes[HEADER_SIZE..];
        let salt = take_prefixed(&mut rest, "salt")?;
        let iv = take_prefixed(&mut rest, "iv")?;
        let tag = take_prefixed(&mut rest, "tag")?;

        Ok(Container {
            version,
            salt,
            iv,
            tag,
            ciphertext: rest.to_vec(),
        })
    }

    /// Convert parsed fields back into an [`EncryptedPayload`] for decryption
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Malformed`] if any field's length doesn't
    /// match the cipher suite's fixed sizes.
    pub fn into_payload(self) -> Result<EncryptedPayload, ContainerError> {
        let salt: [u8; SALT_SIZE] = self
            .salt
            .try_into()
            .map_err(|_| ContainerError::Malformed("unexpected salt length".into()))?;
        let iv: [u8; IV_SIZE] = self
            .iv
            .try_into()
            .map_err(|_| ContainerError::Malformed("unexpected iv length".into()))?;
        let tag: [u8; TAG_SIZE] = self
            .tag
            .try_into()
            .map_err(|_| ContainerError::Malformed("unexpected tag length".into()))?;

        Ok(EncryptedPayload {
            salt,
            iv,
            tag,
            ciphertext: self.ciphertext,
        })
    }
}

/// Split a u16 big-endian length-prefixed field off the front of `rest`
fn take_prefixed(rest: &mut &[u8], field: &'static str) -> Result<Vec<u8>, ContainerError> {
    if rest.len() < 2 {
        return Err(ContainerError::Malformed(format!(
            "truncated before {} length",
            field
        )));
    }
    let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
    let body = &rest[2..];
    if body.len() < len {
        return Err(ContainerError::Malformed(format!("truncated {}", field)));
    }
    let value = body[..len].to_vec();
    *rest = &body[len..];
    Ok(value)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::VaultKey;

    fn sample() -> Container {
        Container {
            version: FORMAT_VERSION,
            salt: vec![1; SALT_SIZE],
            iv: vec![2; IV_SIZE],
            tag: vec![3; TAG_SIZE],
            ciphertext: vec![4; 48],
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let container = sample();
        let bytes = container.encode();
        let decoded = Container::decode(&bytes).unwrap();
        assert_eq!(container, decoded);
    }

    #[test]
    fn test_encode_layout() {
        let bytes = sample().encode();

        assert_eq!(&bytes[..4], b"SSV1");
        assert_eq!(bytes[4], FORMAT_VERSION);
        // salt length prefix
        assert_eq!(&bytes[5..7], &(SALT_SIZE as u16).to_be_bytes());
        assert_eq!(
            bytes.len(),
            4 + 1 + (2 + SALT_SIZE) + (2 + IV_SIZE) + (2 + TAG_SIZE) + 48
        );
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut bytes = sample().encode();
        bytes[0] = b'X';
        assert!(matches!(
            Container::decode(&bytes),
            Err(ContainerError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_version() {
        let mut bytes = sample().encode();
        bytes[4] = 9;
        assert!(matches!(
            Container::decode(&bytes),
            Err(ContainerError::UnsupportedFormat(9))
        ));
    }

    #[test]
    fn test_decode_rejects_truncation_at_every_header_boundary() {
        let bytes = sample().encode();
        // any cut before the end of the tag field must fail deterministically
        for cut in 0..(4 + 1 + 2 + SALT_SIZE + 2 + IV_SIZE + 2 + TAG_SIZE) {
            let result = Container::decode(&bytes[..cut]);
            assert!(
                matches!(
                    result,
                    Err(ContainerError::Malformed(_)) | Err(ContainerError::UnsupportedFormat(_))
                ),
                "cut at {} should not parse",
                cut
            );
        }
    }

    #[test]
    fn test_empty_ciphertext_is_structurally_valid() {
        let mut container = sample();
        container.ciphertext = Vec::new();
        let decoded = Container::decode(&container.encode()).unwrap();
        assert!(decoded.ciphertext.is_empty());
    }

    #[test]
    fn test_into_payload_rejects_wrong_field_sizes() {
        let mut container = sample();
        container.iv = vec![2; 8];
        assert!(matches!(
            container.into_payload(),
            Err(ContainerError::Malformed(_))
        ));
    }

    #[test]
    fn test_container_wraps_real_payload() {
        let key = VaultKey::generate();
        let data = vec![0x5A; 1200];

        let payload = key.encrypt(&data).unwrap();
        let bytes = Container::from(payload).encode();

        // fixed header + three length-prefixed 16-byte fields + padded ciphertext
        assert_eq!(bytes.len(), 4 + 1 + (2 + 16) + (2 + 16) + (2 + 16) + 1216);

        let recovered = Container::decode(&bytes)
            .unwrap()
            .into_payload()
            .unwrap();
        assert_eq!(key.decrypt(&recovered).unwrap(), data);
    }
}
