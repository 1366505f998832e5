//! Record store: authoritative catalog products

use super::collection::{Change, JsonCollection};
use super::{Deleted, DocumentBackend, FileBackend, StoreError};
use catalog_common::models::{ProductDraft, ProductPatch};
use catalog_common::Product;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Durable collection of catalog products
///
/// Ids are random v4 UUIDs assigned here, so an id is never handed out
/// twice, including after deletes and restarts.
pub struct RecordStore {
    docs: JsonCollection<Product>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            docs: JsonCollection::new(backend),
        }
    }

    /// Store backed by a JSON file at `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(path)))
    }

    /// All products in insertion order
    pub async fn list(&self) -> Result<Vec<Product>, StoreError> {
        self.docs.read_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, StoreError> {
        self.list()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    /// Append a product with a freshly assigned id
    pub async fn insert(&self, draft: ProductDraft) -> Result<Product, StoreError> {
        let product = self
            .docs
            .mutate(|products| {
                let id = unused_id(products);
                let product = Product::from_draft(id, draft);
                products.push(product.clone());
                Ok(Change::Write(product))
            })
            .await?;

        info!("Created product {} ({})", product.id, product.title);
        Ok(product)
    }

    /// Shallow-merge `patch` into the product with `id`
    pub async fn update_by_id(&self, id: Uuid, patch: ProductPatch) -> Result<Product, StoreError> {
        let product = self
            .docs
            .mutate(|products| {
                let product = products
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or(StoreError::NotFound(id))?;
                product.apply_patch(patch);
                Ok(Change::Write(product.clone()))
            })
            .await?;

        info!("Updated product {}", id);
        Ok(product)
    }

    /// Remove the product with `id`; absent ids are a no-op
    pub async fn delete_by_id(&self, id: Uuid) -> Result<Deleted<Product>, StoreError> {
        let deleted = self
            .docs
            .mutate(|products| {
                let before = products.len();
                products.retain(|p| p.id != id);
                let removed = products.len() != before;
                let deleted = Deleted {
                    removed,
                    remaining: products.clone(),
                };
                Ok(if removed {
                    Change::Write(deleted)
                } else {
                    Change::Keep(deleted)
                })
            })
            .await?;

        if deleted.removed {
            info!("Deleted product {}", id);
        }
        Ok(deleted)
    }
}

fn unused_id(products: &[Product]) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if products.iter().all(|p| p.id != id) {
            return id;
        }
    }
}
