//! Storage abstraction layer for ruledex.
//!
//! The index store persists its snapshot, write-ahead log and manifest
//! through this facade, so file and memory backends can be swapped without
//! touching the index code.
//!
//! # Storage Types
//!
//! ## FileStorage
//! - Disk-based persistent storage under one directory
//! - Configurable buffering and syncing
//!
//! ## MemoryStorage
//! - In-memory storage for testing and temporary indexes
//! - Fast but non-persistent
//!
//! # Example
//!
//! ```
//! use ruledex::storage::{StorageConfig, StorageFactory};
//! use ruledex::storage::memory::MemoryStorageConfig;
//!
//! # fn main() -> ruledex::error::Result<()> {
//! let storage = StorageFactory::create(StorageConfig::Memory(MemoryStorageConfig::default()))?;
//! assert!(!storage.file_exists("manifest.json"));
//! # Ok(())
//! # }
//! ```

use std::io::{Read, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RuledexError};

pub mod file;
pub mod memory;

/// A trait for storage backends that can store and retrieve named files.
pub trait Storage: Send + Sync + std::fmt::Debug {
    /// Open an existing file for reading.
    ///
    /// Returns a `FileNotFound` storage error if the file doesn't exist.
    fn open_input(&self, name: &str) -> Result<Box<dyn StorageInput>>;

    /// Create a file for writing, truncating any existing content.
    ///
    /// The content becomes visible once the output is closed.
    fn create_output(&self, name: &str) -> Result<Box<dyn StorageOutput>>;

    /// Check if a file exists.
    fn file_exists(&self, name: &str) -> bool;

    /// Delete a file. Deleting a missing file is not an error.
    fn delete_file(&self, name: &str) -> Result<()>;

    /// List all files, sorted by name.
    fn list_files(&self) -> Result<Vec<String>>;

    /// Size of a file in bytes.
    fn file_size(&self, name: &str) -> Result<u64>;

    /// Rename a file, replacing any file already named `new_name`.
    fn rename_file(&self, old_name: &str, new_name: &str) -> Result<()>;

    /// Make all closed outputs durable.
    fn sync(&self) -> Result<()>;

    /// Close the storage. Later operations fail with `StorageClosed`.
    fn close(&self) -> Result<()>;
}

/// A trait for reading data from storage.
pub trait StorageInput: Read + Send + std::fmt::Debug {
    /// Get the size of the underlying data.
    fn size(&self) -> Result<u64>;

    /// Close the input.
    fn close(&mut self) -> Result<()>;
}

/// A trait for writing data to storage.
pub trait StorageOutput: Write + Send + std::fmt::Debug {
    /// Flush buffered data and sync it to the backing medium.
    fn flush_and_sync(&mut self) -> Result<()>;

    /// Number of bytes written so far.
    fn position(&self) -> Result<u64>;

    /// Close the output, publishing its content.
    fn close(&mut self) -> Result<()>;
}

/// Read a whole file.
pub fn read_file(storage: &dyn Storage, name: &str) -> Result<Vec<u8>> {
    let mut input = storage.open_input(name)?;
    let mut buffer = Vec::with_capacity(input.size()? as usize);
    input.read_to_end(&mut buffer)?;
    input.close()?;
    Ok(buffer)
}

/// Write a whole file, replacing it atomically via a temporary file.
pub fn write_file_atomic(storage: &dyn Storage, name: &str, bytes: &[u8]) -> Result<()> {
    let tmp_name = format!("{name}.tmp");
    let mut output = storage.create_output(&tmp_name)?;
    output.write_all(bytes)?;
    output.flush_and_sync()?;
    output.close()?;
    storage.rename_file(&tmp_name, name)
}

/// Configuration for storage backends.
///
/// Each variant carries the configuration specific to its backend, including
/// the directory for file-based storage.
///
/// ```
/// use ruledex::storage::StorageConfig;
/// use ruledex::storage::file::FileStorageConfig;
///
/// let config: StorageConfig =
///     serde_json::from_str(r#"{"type": "file", "path": "/var/lib/ruledex"}"#).unwrap();
/// assert!(matches!(config, StorageConfig::File(FileStorageConfig { .. })));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageConfig {
    /// File-based storage.
    File(file::FileStorageConfig),

    /// In-memory storage.
    Memory(memory::MemoryStorageConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Memory(memory::MemoryStorageConfig::default())
    }
}

/// A factory for creating storage instances.
pub struct StorageFactory;

impl StorageFactory {
    /// Create a storage backend from its configuration.
    pub fn create(config: StorageConfig) -> Result<Arc<dyn Storage>> {
        match config {
            StorageConfig::Memory(mem_config) => {
                let storage = memory::MemoryStorage::new(mem_config);
                Ok(Arc::new(storage))
            }
            StorageConfig::File(file_config) => {
                let path = file_config.path.clone();
                let storage = file::FileStorage::new(&path, file_config)?;
                Ok(Arc::new(storage))
            }
        }
    }
}

/// Error types specific to storage operations.
#[derive(Debug, Clone)]
pub enum StorageError {
    /// File not found.
    FileNotFound(String),

    /// I/O error.
    IoError(String),

    /// Storage is closed.
    StorageClosed,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::FileNotFound(name) => write!(f, "File not found: {name}"),
            StorageError::IoError(msg) => write!(f, "I/O error: {msg}"),
            StorageError::StorageClosed => write!(f, "Storage is closed"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for RuledexError {
    fn from(err: StorageError) -> Self {
        RuledexError::storage(err.to_string())
    }
}
