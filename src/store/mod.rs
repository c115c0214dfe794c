//! Cart Storage
//!
//! The cart is mirrored to a key-value store on every mutation. A store only ever
//! holds serialized snapshots; it knows nothing about carts.

use thiserror::Error;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a [`CartStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying IO failure
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used by this store
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Persistent key-value store holding serialized cart snapshots.
pub trait CartStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the value cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete `key`. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the key cannot be removed.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}
