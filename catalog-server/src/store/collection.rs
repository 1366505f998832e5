//! Generic read-modify-write collection over a document backend

use super::{DocumentBackend, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

/// What a mutation closure decided
pub(crate) enum Change<R> {
    /// Persist the modified collection, then return the value
    Write(R),
    /// Nothing changed; skip the write
    Keep(R),
}

/// A JSON array of records in one backing document
///
/// Holds no in-memory copy: every operation reads the document, so the
/// visible state is always the last durable state.
pub struct JsonCollection<T> {
    backend: Arc<dyn DocumentBackend>,
    /// Single-writer queue for this document. Tokio's mutex is fair, so
    /// queued mutations run in arrival order.
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Read every record in document order.
    ///
    /// A document that was never written (or is blank) is an empty
    /// collection; unreadable or malformed content is `StorageUnavailable`.
    pub async fn read_all(&self) -> Result<Vec<T>, StoreError> {
        let bytes = self.backend.load().await.map_err(|e| {
            StoreError::StorageUnavailable(format!("cannot read {}: {}", self.location(), e))
        })?;

        match bytes {
            None => Ok(Vec::new()),
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::StorageUnavailable(format!("malformed {}: {}", self.location(), e))
            }),
        }
    }

    /// Run one read-modify-write cycle inside the writer queue.
    ///
    /// The closure works on a fresh copy; if it fails, or the write fails,
    /// nothing is persisted and the error is returned.
    pub(crate) async fn mutate<R, F>(&self, apply: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<Change<R>, StoreError>,
    {
        let _writer = self.write_lock.lock().await;

        let mut records = self.read_all().await?;
        let value = match apply(&mut records)? {
            Change::Keep(value) => return Ok(value),
            Change::Write(value) => value,
        };

        let bytes = serde_json::to_vec_pretty(&records).map_err(|e| {
            StoreError::PersistenceFailure(format!("cannot encode {}: {}", self.location(), e))
        })?;

        if let Err(e) = self.backend.store(&bytes).await {
            error!("Write to {} failed: {}", self.location(), e);
            return Err(StoreError::PersistenceFailure(format!(
                "cannot write {}: {}",
                self.location(),
                e
            )));
        }

        debug!("Wrote {} records to {}", records.len(), self.location());
        Ok(value)
    }
}
