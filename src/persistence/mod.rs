//! Key/value persistence
//!
//! Values are stored as a versioned JSON envelope so a format change can be
//! detected on load. Backends:
//! - `LocalStorage` (browser, wasm32 only)
//! - `MemoryStorage` (native runs and tests)

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Why a stored value could not be read or written
#[derive(Debug)]
pub enum PersistError {
    /// No storage backend (private browsing, native build)
    Unavailable,
    /// Nothing stored under the key
    Missing,
    /// Stored text is not a valid envelope
    Corrupt(serde_json::Error),
    VersionMismatch { found: u32, expected: u32 },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Unavailable => write!(f, "storage unavailable"),
            PersistError::Missing => write!(f, "no stored value"),
            PersistError::Corrupt(e) => write!(f, "corrupt stored value: {e}"),
            PersistError::VersionMismatch { found, expected } => {
                write!(f, "stored version {found}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistError::Corrupt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(e: serde_json::Error) -> Self {
        PersistError::Corrupt(e)
    }
}

/// String key/value store
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// In-process store
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if inner.is_none() {
            log::warn!("LocalStorage unavailable - scores and settings will not persist");
        }
        Self { inner }
    }

    fn store(&self) -> Result<&web_sys::Storage, PersistError> {
        self.inner.as_ref().ok_or(PersistError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.store()?
            .get_item(key)
            .map_err(|_| PersistError::Unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        // Quota errors surface as a JS exception
        self.store()?
            .set_item(key, value)
            .map_err(|_| PersistError::Unavailable)
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.store()?
            .remove_item(key)
            .map_err(|_| PersistError::Unavailable)
    }
}

/// Stored form of every persisted value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub version: u32,
    pub data: T,
}

/// Read the raw envelope without checking its version
pub fn load_envelope<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Envelope<T>, PersistError> {
    let json = storage.get(key)?.ok_or(PersistError::Missing)?;
    Ok(serde_json::from_str(&json)?)
}

/// Read a value written with exactly `expected` version
pub fn load_versioned<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
    expected: u32,
) -> Result<T, PersistError> {
    let envelope: Envelope<T> = load_envelope(storage, key)?;
    if envelope.version != expected {
        return Err(PersistError::VersionMismatch {
            found: envelope.version,
            expected,
        });
    }
    Ok(envelope.data)
}

pub fn save_versioned<T: Serialize>(
    storage: &mut dyn Storage,
    key: &str,
    version: u32,
    data: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(&Envelope { version, data })?;
    storage.set(key, &json)
}
