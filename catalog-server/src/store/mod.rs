//! Durable JSON collections
//!
//! Each collection lives in one JSON document holding an array of records,
//! rewritten wholesale on every mutation. Mutations of one document are
//! serialized through that collection's writer lock; plain reads run
//! concurrently and always see a complete document because writes replace
//! the file atomically.

mod backend;
mod collection;
mod live;
mod products;

pub use backend::{DocumentBackend, FileBackend};
pub use collection::JsonCollection;
pub use live::LiveBuffer;
pub use products::RecordStore;

use thiserror::Error;
use uuid::Uuid;

/// Store-level failures, mapped to caller responses by the gateway
#[derive(Error, Debug)]
pub enum StoreError {
    /// Update referenced an id that is not in the collection
    #[error("Record not found: {0}")]
    NotFound(Uuid),

    /// New state could not be written durably; nothing was applied
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Existing document could not be read or is malformed
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Result of an idempotent delete
#[derive(Debug, Clone, PartialEq)]
pub struct Deleted<T> {
    /// False when the id was absent and the document was left untouched
    pub removed: bool,
    /// Full collection after the delete
    pub remaining: Vec<T>,
}
