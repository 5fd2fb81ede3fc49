//! Shared data types for the windowed cursor.

use serde::{Deserialize, Serialize};

/// A single key/value pair held in the cursor window.
///
/// `K` is the unique, totally ordered key assigned by the data source
/// (ascending); `V` is an opaque value. Serde bounds are forwarded so any
/// serializable key/value types can be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize, V: Serialize",
    deserialize = "K: serde::de::DeserializeOwned, V: serde::de::DeserializeOwned"
))]
pub struct Entry<K, V> {
    /// Key assigned by the data source; defines the window order.
    pub key: K,
    /// The stored value.
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry from a key and a value.
    #[must_use]
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// Direction of a window extension relative to the current contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward smaller keys (older items).
    Before,
    /// Toward larger keys (newer items).
    After,
}

impl Direction {
    /// The other direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Before => Self::After,
            Self::After => Self::Before,
        }
    }
}
