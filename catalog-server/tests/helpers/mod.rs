//! Shared test helpers: scratch catalogs and instrumented storage backends

#![allow(dead_code)]

use async_trait::async_trait;
use catalog_server::catalog::Catalog;
use catalog_server::store::{DocumentBackend, FileBackend, LiveBuffer, RecordStore};
use catalog_server::CatalogService;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::{Notify, Semaphore};

pub const PRODUCTS_FILE: &str = "products.json";
pub const LIVE_FILE: &str = "liveProducts.json";

/// Service over plain files in a fresh temp folder
pub fn file_service() -> (TempDir, CatalogService) {
    let dir = TempDir::new().expect("temp dir");
    let catalog = Catalog::new(
        RecordStore::open(dir.path().join(PRODUCTS_FILE)),
        LiveBuffer::open(dir.path().join(LIVE_FILE)),
    );
    (dir, CatalogService::new(catalog))
}

/// Service whose record store uses `backend`
pub fn service_with_product_backend(
    dir: &TempDir,
    backend: Arc<dyn DocumentBackend>,
) -> CatalogService {
    CatalogService::new(Catalog::new(
        RecordStore::new(backend),
        LiveBuffer::open(dir.path().join(LIVE_FILE)),
    ))
}

/// Holds every write until the test releases it
pub struct GatedBackend {
    inner: FileBackend,
    pub write_started: Arc<Notify>,
    pub release: Arc<Semaphore>,
}

impl GatedBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            inner: FileBackend::new(path),
            write_started: Arc::new(Notify::new()),
            release: Arc::new(Semaphore::new(0)),
        }
    }
}

#[async_trait]
impl DocumentBackend for GatedBackend {
    async fn load(&self) -> io::Result<Option<Vec<u8>>> {
        self.inner.load().await
    }

    async fn store(&self, bytes: &[u8]) -> io::Result<()> {
        self.write_started.notify_one();
        self.release
            .acquire()
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .forget();
        self.inner.store(bytes).await
    }

    fn location(&self) -> String {
        self.inner.location()
    }
}

/// Reads normally, refuses every write
pub struct ReadOnlyBackend {
    inner: FileBackend,
}

impl ReadOnlyBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            inner: FileBackend::new(path),
        }
    }
}

#[async_trait]
impl DocumentBackend for ReadOnlyBackend {
    async fn load(&self) -> io::Result<Option<Vec<u8>>> {
        self.inner.load().await
    }

    async fn store(&self, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }

    fn location(&self) -> String {
        self.inner.location()
    }
}
