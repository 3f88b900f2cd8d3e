mod locks;
mod store;

pub use store::{VaultStore, VaultStoreError};
