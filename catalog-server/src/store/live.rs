//! Live submission buffer: ephemeral kiosk records, write-once and delete-only

use super::collection::{Change, JsonCollection};
use super::{Deleted, DocumentBackend, FileBackend, StoreError};
use catalog_common::models::LiveDraft;
use catalog_common::LiveSubmission;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Durable collection of live submissions, separate from the catalog
pub struct LiveBuffer {
    docs: JsonCollection<LiveSubmission>,
}

impl LiveBuffer {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            docs: JsonCollection::new(backend),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(path)))
    }

    pub async fn list(&self) -> Result<Vec<LiveSubmission>, StoreError> {
        self.docs.read_all().await
    }

    pub async fn insert(&self, draft: LiveDraft) -> Result<LiveSubmission, StoreError> {
        let submission = self
            .docs
            .mutate(|records| {
                let mut id = Uuid::new_v4();
                while records.iter().any(|r| r.id == id) {
                    id = Uuid::new_v4();
                }
                let submission = LiveSubmission::from_draft(id, Utc::now(), draft);
                records.push(submission.clone());
                Ok(Change::Write(submission))
            })
            .await?;

        info!(
            "Live submission {} from {} ({})",
            submission.id, submission.submitter_name, submission.title
        );
        Ok(submission)
    }

    /// Remove the submission with `id`; absent ids are a no-op
    pub async fn delete_by_id(&self, id: Uuid) -> Result<Deleted<LiveSubmission>, StoreError> {
        let deleted = self
            .docs
            .mutate(|records| {
                let Some(pos) = records.iter().position(|r| r.id == id) else {
                    return Ok(Change::Keep(Deleted {
                        removed: false,
                        remaining: records.clone(),
                    }));
                };
                records.remove(pos);
                Ok(Change::Write(Deleted {
                    removed: true,
                    remaining: records.clone(),
                }))
            })
            .await?;

        if deleted.removed {
            info!("Deleted live submission {}", id);
        }
        Ok(deleted)
    }
}
