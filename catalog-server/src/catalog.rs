//! Both durable collections behind one handle

use crate::store::{LiveBuffer, RecordStore, StoreError};
use catalog_common::config::ServiceConfig;
use catalog_common::{merge, MergedView};

/// Record store plus live submission buffer, each with its own writer queue
pub struct Catalog {
    pub products: RecordStore,
    pub live: LiveBuffer,
}

impl Catalog {
    pub fn new(products: RecordStore, live: LiveBuffer) -> Self {
        Self { products, live }
    }

    /// Catalog backed by the files named in `config`
    pub fn open(config: &ServiceConfig) -> Self {
        Self::new(
            RecordStore::open(config.products_path()),
            LiveBuffer::open(config.live_products_path()),
        )
    }

    /// Re-read both collections and merge them. Never cached.
    pub async fn merged_view(&self) -> Result<MergedView, StoreError> {
        let (products, live) = tokio::try_join!(self.products.list(), self.live.list())?;
        Ok(merge(products, live))
    }
}
