//! Fan-out of the merged view to connected subscribers
//!
//! Every subscriber owns a latest-value slot. A broadcast recomputes the
//! merged view once and overwrites every slot, so a slow subscriber skips
//! intermediate views but always ends on the newest one, and a gone
//! subscriber never blocks the others.

use crate::catalog::Catalog;
use crate::store::StoreError;
use catalog_common::MergedView;
use futures::stream::Stream;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Identifies one registered subscriber
pub type SubscriberId = u64;

type Slot = watch::Sender<Arc<MergedView>>;

/// Subscriber registry plus the view source it broadcasts from
#[derive(Clone)]
pub struct FanoutChannel {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<Catalog>,
    subscribers: Mutex<HashMap<SubscriberId, Slot>>,
    next_id: AtomicU64,
    /// Serializes "compute view + deliver" so no subscriber ever receives an
    /// older view after a newer one
    publish: tokio::sync::Mutex<()>,
}

impl FanoutChannel {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        info!("Fan-out channel initialized");
        Self {
            inner: Arc::new(Inner {
                catalog,
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                publish: tokio::sync::Mutex::new(()),
            }),
        }
    }

    /// Register a subscriber, seeded with the merged view as of now
    pub async fn subscribe(&self) -> Result<Subscription, StoreError> {
        let _publish = self.inner.publish.lock().await;
        let view = Arc::new(self.inner.catalog.merged_view().await?);

        let (slot, rx) = watch::channel(view);
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let count = {
            let mut subscribers = self.registry();
            subscribers.insert(id, slot);
            subscribers.len()
        };

        info!("Subscriber {} connected, total subscribers: {}", id, count);
        Ok(Subscription {
            id,
            rx,
            channel: self.clone(),
        })
    }

    /// Remove a subscriber. Safe to call repeatedly; returns whether it was
    /// still registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.registry().remove(&id).is_some();
        if removed {
            info!("Subscriber {} disconnected", id);
        }
        removed
    }

    /// Recompute the merged view and push it to every subscriber.
    ///
    /// Call only after the triggering write is durable. Returns the number of
    /// subscribers reached; unreachable ones are logged and dropped.
    pub async fn broadcast_update(&self) -> Result<usize, StoreError> {
        let _publish = self.inner.publish.lock().await;
        let view = Arc::new(self.inner.catalog.merged_view().await?);

        let mut subscribers = self.registry();
        subscribers.retain(|id, slot| match slot.send(Arc::clone(&view)) {
            Ok(()) => true,
            Err(_) => {
                warn!("Subscriber {} unreachable, removing", id);
                false
            }
        });

        let delivered = subscribers.len();
        debug!("Broadcast {} items to {} subscribers", view.len(), delivered);
        Ok(delivered)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().len()
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<SubscriberId, Slot>> {
        // Entries stay valid even if a holder panicked
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A registered subscriber's end of the channel. Dropping it unsubscribes.
pub struct Subscription {
    id: SubscriberId,
    rx: watch::Receiver<Arc<MergedView>>,
    channel: FanoutChannel,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Latest delivered view, marking it as seen
    pub fn current(&mut self) -> Arc<MergedView> {
        let view = self.rx.borrow_and_update();
        Arc::clone(&*view)
    }

    /// Whether a view arrived that `current`/`next` has not returned yet
    pub fn has_pending(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next broadcast. `None` once unsubscribed.
    pub async fn next(&mut self) -> Option<Arc<MergedView>> {
        self.rx.changed().await.ok()?;
        Some(self.current())
    }

    /// Initial view followed by every later broadcast
    pub fn into_stream(mut self) -> impl Stream<Item = Arc<MergedView>> + Send {
        async_stream::stream! {
            yield self.current();
            while let Some(view) = self.next().await {
                yield view;
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.channel.unsubscribe(self.id);
    }
}
