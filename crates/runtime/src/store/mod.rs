//! Key-value persistence for player data.
//!
//! The session reads high score, username and diagnosis history at start and
//! writes them back as they change. Everything goes through
//! [`KeyValueStore`] so tests can swap the file-backed store for memory.

mod error;
mod file;
mod memory;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::InMemoryStore;

/// String-keyed, string-valued storage with get/set/remove semantics.
///
/// Writes are idempotent; repeating a `set` with the same value is harmless
/// and the last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
