// ABOUTME: Key/value storage backends for wizard drafts
//
// The wizard never touches the filesystem directly; it talks to a
// `DraftStorage` implementation injected at construction:
// - file: one JSON document per key under a directory (the CLI default)
// - memory: shared in-process map (tests, throwaway sessions)
// - draft: snapshot envelope with TTL-checked reads on top of any backend

pub mod draft;
pub mod file;
pub mod memory;

use thiserror::Error;

pub use draft::{DraftSnapshot, DraftStore, PersistedDraft, DRAFT_FORMAT_VERSION, DRAFT_KEY};
pub use file::FileStorage;
pub use memory::MemoryStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Stored item {key} is unreadable: {reason}")]
    Corrupt { key: String, reason: String },
}

/// String key/value storage, modelled on browser local storage
pub trait DraftStorage: Send {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: DraftStorage + ?Sized> DraftStorage for Box<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}
