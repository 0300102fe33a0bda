use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;

/// Keys under which the cart collections are persisted.
///
/// Each collection serializes independently so a partial write cannot
/// corrupt the others.
pub mod keys {
    /// Cart lines.
    pub const CART: &str = "cart";

    /// Saved-for-later lines.
    pub const SAVED_ITEMS: &str = "saved_items";

    /// Wishlist entries.
    pub const WISHLIST: &str = "wishlist";
}

/// Core trait for the local persistent store.
///
/// Key-addressed string storage with synchronous get/set, matching the
/// browser-origin storage the cart state survives reloads in. No
/// expiry; concurrent writers are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Extension trait providing typed JSON access on top of the raw
/// string store.
pub trait KeyValueStoreExt: KeyValueStore {
    /// Loads and deserializes the value under `key`.
    ///
    /// A corrupt stored value is discarded and treated as absent
    /// rather than failing the caller; state that cannot be parsed is
    /// no better than state that was never written.
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            None => Ok(None),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => Ok(Some(value)),
                Err(error) => {
                    tracing::warn!(key, %error, "discarding corrupt stored value");
                    Ok(None)
                }
            },
        }
    }

    /// Serializes `value` and stores it under `key`.
    fn store_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}
