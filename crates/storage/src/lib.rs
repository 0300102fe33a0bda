//! Local persistent store for cart state.
//!
//! Cart, saved-for-later and wishlist collections serialize to a
//! key-addressed string store so state survives a reload even for
//! anonymous sessions. Two implementations are provided: an in-memory
//! store and a file-backed store with atomic writes.

pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use error::{Result, StorageError};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use store::{KeyValueStore, KeyValueStoreExt, keys};
