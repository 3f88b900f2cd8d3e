mod registry;

pub use registry::{ApiKeyRegistry, CredentialError, IssuedKey, KeyRegistryError};
