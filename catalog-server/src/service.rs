//! Mutation gateway
//!
//! Every transport (HTTP handlers, WebSocket events) goes through
//! [`CatalogService`]: validate, apply to the owning store, and only after
//! the write is durable, broadcast the recomputed merged view once. The
//! broadcast is awaited before the caller gets its answer, so no caller sees
//! a response before other subscribers can see the change.
//!
//! Write and broadcast run on their own task. A caller that goes away
//! (dropped HTTP request, closed socket) stops waiting for the result but
//! never cancels a mutation that has started.

use crate::catalog::Catalog;
use crate::error::{ApiError, ApiResult};
use crate::fanout::{FanoutChannel, Subscription};
use crate::store::StoreError;
use catalog_common::config::ServiceConfig;
use catalog_common::events::ClientMessage;
use catalog_common::models::{LiveDraft, ProductDraft, ProductPatch};
use catalog_common::{LiveSubmission, MergedView, Product};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogService {
    catalog: Arc<Catalog>,
    fanout: FanoutChannel,
}

impl CatalogService {
    pub fn new(catalog: Catalog) -> Self {
        let catalog = Arc::new(catalog);
        let fanout = FanoutChannel::new(Arc::clone(&catalog));
        Self { catalog, fanout }
    }

    /// Service over the backing files named in `config`
    pub fn open(config: &ServiceConfig) -> Self {
        Self::new(Catalog::open(config))
    }

    pub fn fanout(&self) -> &FanoutChannel {
        &self.fanout
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn merged_view(&self) -> ApiResult<MergedView> {
        Ok(self.catalog.merged_view().await?)
    }

    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.catalog.products.list().await?)
    }

    pub async fn get_product(&self, id: Uuid) -> ApiResult<Product> {
        Ok(self.catalog.products.get(id).await?)
    }

    pub async fn list_live(&self) -> ApiResult<Vec<LiveSubmission>> {
        Ok(self.catalog.live.list().await?)
    }

    /// Register a push subscriber seeded with the current merged view
    pub async fn subscribe(&self) -> ApiResult<Subscription> {
        Ok(self.fanout.subscribe().await?)
    }

    // ------------------------------------------------------------------
    // Catalog mutations
    // ------------------------------------------------------------------

    pub async fn create_product(&self, body: Value) -> ApiResult<Product> {
        let draft = ProductDraft::try_from(body)?;
        self.commit(|catalog| async move {
            catalog.products.insert(draft).await.map(|p| (p, true))
        })
        .await
    }

    pub async fn update_product(&self, id: Uuid, body: Value) -> ApiResult<Product> {
        let patch = ProductPatch::parse(body, id)?;
        self.commit(move |catalog| async move {
            catalog.products.update_by_id(id, patch).await.map(|p| (p, true))
        })
        .await
    }

    /// Idempotent; returns the catalog after the delete. Deleting an id that
    /// is not present writes nothing and does not broadcast.
    pub async fn delete_product(&self, id: Uuid) -> ApiResult<Vec<Product>> {
        self.commit(move |catalog| async move {
            let deleted = catalog.products.delete_by_id(id).await;
            deleted.map(|d| (d.remaining, d.removed))
        })
        .await
    }

    // ------------------------------------------------------------------
    // Live buffer mutations
    // ------------------------------------------------------------------

    /// `body` may carry an `imageRef` already stored by the upload handler
    pub async fn create_live(&self, body: Value) -> ApiResult<LiveSubmission> {
        let draft = LiveDraft::try_from(body)?;
        self.commit(|catalog| async move {
            catalog.live.insert(draft).await.map(|s| (s, true))
        })
        .await
    }

    /// Idempotent; returns the live buffer after the delete. Deleting an id
    /// that is not present writes nothing and does not broadcast.
    pub async fn delete_live(&self, id: Uuid) -> ApiResult<Vec<LiveSubmission>> {
        self.commit(move |catalog| async move {
            let deleted = catalog.live.delete_by_id(id).await;
            deleted.map(|d| (d.remaining, d.removed))
        })
        .await
    }

    /// Apply an event sent by a push subscriber
    pub async fn handle_client_message(&self, message: ClientMessage) -> ApiResult<()> {
        match message {
            ClientMessage::DeleteProduct(id) => {
                self.delete_live(id).await?;
            }
            ClientMessage::NewProduct(fields) => {
                self.create_live(fields).await?;
            }
        }
        Ok(())
    }

    /// Run a store write on a detached task, then broadcast once if the
    /// write reports a durable change.
    ///
    /// The caller only awaits the outcome, so dropping the caller leaves the
    /// write and its broadcast running to completion.
    async fn commit<T, F, Fut>(&self, write: F) -> ApiResult<T>
    where
        F: FnOnce(Arc<Catalog>) -> Fut,
        Fut: Future<Output = Result<(T, bool), StoreError>> + Send + 'static,
        T: Send + 'static,
    {
        let pending = write(Arc::clone(&self.catalog));
        let fanout = self.fanout.clone();

        let task = tokio::spawn(async move {
            let (value, changed) = pending.await?;
            if changed {
                publish(&fanout).await;
            }
            Ok::<T, StoreError>(value)
        });

        match task.await {
            Ok(outcome) => Ok(outcome?),
            Err(e) => {
                error!("Mutation task ended abnormally: {}", e);
                Err(ApiError::Persistence(format!("mutation did not complete: {}", e)))
            }
        }
    }
}

/// The mutation already succeeded durably, so a failed recompute is logged
/// rather than reported to the caller.
async fn publish(fanout: &FanoutChannel) {
    match fanout.broadcast_update().await {
        Ok(count) => debug!("Merged view pushed to {} subscribers", count),
        Err(e) => error!("Broadcast skipped, merged view unavailable: {}", e),
    }
}
