//! Persisted mirror backends for the cart store.
//!
//! A backend holds one blob per client key: the ordered JSON array of
//! [`CartLine`] records. There is no versioning; a layout change means the
//! old blobs have to be invalidated by hand.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use shopfront_core::CartLine;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::ClientKey;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the blob failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored blob could not be decoded.
    #[error("corrupt cart blob for client {client}: {source}")]
    Corrupt {
        client: ClientKey,
        #[source]
        source: serde_json::Error,
    },

    /// Lines could not be encoded.
    #[error("failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Storage interface owned by the cart store.
///
/// Implementations are synchronous: a cart commit runs to completion before
/// the operation that triggered it returns.
pub trait CartStorage: Send + Sync {
    /// Load the lines stored for `client`. A client with no blob has an
    /// empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the blob exists but cannot be read or
    /// decoded.
    fn load(&self, client: &ClientKey) -> Result<Vec<CartLine>, StorageError>;

    /// Replace the blob stored for `client`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the blob cannot be written.
    fn save(&self, client: &ClientKey, lines: &[CartLine]) -> Result<(), StorageError>;
}

impl<T: CartStorage + ?Sized> CartStorage for Arc<T> {
    fn load(&self, client: &ClientKey) -> Result<Vec<CartLine>, StorageError> {
        (**self).load(client)
    }

    fn save(&self, client: &ClientKey, lines: &[CartLine]) -> Result<(), StorageError> {
        (**self).save(client, lines)
    }
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self, client: &ClientKey) -> Result<Vec<CartLine>, StorageError> {
        (**self).load(client)
    }

    fn save(&self, client: &ClientKey, lines: &[CartLine]) -> Result<(), StorageError> {
        (**self).save(client, lines)
    }
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// How long an untouched cart is kept in memory. Matches the session
/// cookie lifetime, after which the client key is unreachable anyway.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Process-local storage. Carts survive page reloads but not restarts.
///
/// Blobs live in a cache that drops a client's cart once it has gone
/// unread and unwritten for the idle timeout.
pub struct MemoryStorage {
    blobs: Cache<ClientKey, Vec<CartLine>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    /// Drop carts that have not been touched for `idle`.
    #[must_use]
    pub fn with_idle_timeout(idle: Duration) -> Self {
        Self {
            blobs: Cache::builder().time_to_idle(idle).build(),
        }
    }

    /// Number of clients with a stored cart.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.blobs.run_pending_tasks();
        usize::try_from(self.blobs.entry_count()).unwrap_or(usize::MAX)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("clients", &self.blobs.entry_count())
            .finish_non_exhaustive()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, client: &ClientKey) -> Result<Vec<CartLine>, StorageError> {
        Ok(self.blobs.get(client).unwrap_or_default())
    }

    fn save(&self, client: &ClientKey, lines: &[CartLine]) -> Result<(), StorageError> {
        if lines.is_empty() {
            self.blobs.invalidate(client);
        } else {
            self.blobs.insert(client.clone(), lines.to_vec());
        }
        Ok(())
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// One JSON file per client under a directory (`<dir>/<client-key>.json`).
///
/// Each write goes to its own uniquely named temporary file in the same
/// directory, which is then renamed over the blob. A crash mid-write never
/// leaves a truncated cart behind, and concurrent writers never share a
/// temp path. An empty cart removes the file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the blob directory. It is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, client: &ClientKey) -> PathBuf {
        self.dir.join(format!("{client}.json"))
    }

    /// Client keys that currently have a stored cart, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be listed.
    pub fn clients(&self) -> Result<Vec<ClientKey>, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut clients: Vec<ClientKey> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension()? != "json" {
                    return None;
                }
                path.file_stem()?.to_str()?.parse().ok()
            })
            .collect();
        clients.sort();
        Ok(clients)
    }
}

impl CartStorage for FileStorage {
    fn load(&self, client: &ClientKey) -> Result<Vec<CartLine>, StorageError> {
        let path = self.blob_path(client);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StorageError::Io { path, source }),
        };

        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            client: client.clone(),
            source,
        })
    }

    fn save(&self, client: &ClientKey, lines: &[CartLine]) -> Result<(), StorageError> {
        let path = self.blob_path(client);

        if lines.is_empty() {
            return match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(source) => Err(StorageError::Io { path, source }),
            };
        }

        let body = serde_json::to_vec(lines).map_err(StorageError::Encode)?;

        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        tmp.write_all(&body).map_err(|source| StorageError::Io {
            path: tmp.path().to_path_buf(),
            source,
        })?;
        tmp.persist(&path).map_err(|e| StorageError::Io {
            path,
            source: e.error,
        })?;
        Ok(())
    }
}
