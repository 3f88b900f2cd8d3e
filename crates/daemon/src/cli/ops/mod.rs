pub mod daemon;
pub mod health;
pub mod init;
pub mod keys;
pub mod vault;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use keys::Keys;
pub use vault::Vault;
pub use version::Version;
