//! Catalog records and the merged presentation view
//!
//! Both record kinds are open: any top-level field beyond the typed ones is
//! kept in `extra` and round-trips through the backing JSON file untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Free-form top-level fields carried alongside the typed ones
pub type Fields = Map<String, Value>;

/// Authoritative catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Assigned by the record store, never by the caller
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Product {
    /// Build a stored product from validated caller fields
    pub fn from_draft(id: Uuid, draft: ProductDraft) -> Self {
        Self {
            id,
            title: draft.title,
            price: draft.price,
            extra: draft.extra,
        }
    }

    /// Shallow merge: supplied top-level fields overwrite, others are kept.
    /// The id never changes.
    pub fn apply_patch(&mut self, patch: ProductPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        self.extra.extend(patch.extra);
    }
}

/// Validated fields for a new product (no id)
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub price: f64,
    pub extra: Fields,
}

/// Validated partial fields for a product update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub extra: Fields,
}

/// Ephemeral record submitted through the live ingress
///
/// Write-once: after creation it can only be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSubmission {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub submitter_name: String,
    pub submitter_contact: String,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl LiveSubmission {
    pub fn from_draft(id: Uuid, submitted_at: DateTime<Utc>, draft: LiveDraft) -> Self {
        Self {
            id,
            title: draft.title,
            price: draft.price,
            submitter_name: draft.submitter_name,
            submitter_contact: draft.submitter_contact,
            image_ref: draft.image_ref,
            submitted_at,
            extra: draft.extra,
        }
    }
}

/// Validated fields for a new live submission, defaults already applied
#[derive(Debug, Clone, PartialEq)]
pub struct LiveDraft {
    pub title: String,
    pub price: f64,
    pub submitter_name: String,
    pub submitter_contact: String,
    pub image_ref: Option<String>,
    pub extra: Fields,
}

/// One entry of the merged view, tagged with the collection it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MergedItem {
    Catalog(Product),
    Live(LiveSubmission),
}

impl MergedItem {
    pub fn id(&self) -> Uuid {
        match self {
            MergedItem::Catalog(p) => p.id,
            MergedItem::Live(l) => l.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MergedItem::Catalog(p) => &p.title,
            MergedItem::Live(l) => &l.title,
        }
    }

    pub fn price(&self) -> f64 {
        match self {
            MergedItem::Catalog(p) => p.price,
            MergedItem::Live(l) => l.price,
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, MergedItem::Live(_))
    }
}

/// Derived, read-only sequence shown to every viewer
///
/// Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedView {
    items: Vec<MergedItem>,
}

impl MergedView {
    pub(crate) fn from_items(items: Vec<MergedItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[MergedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Catalog portion, in store order
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.items.iter().filter_map(|item| match item {
            MergedItem::Catalog(p) => Some(p),
            MergedItem::Live(_) => None,
        })
    }

    /// Live portion, in store order
    pub fn live_submissions(&self) -> impl Iterator<Item = &LiveSubmission> {
        self.items.iter().filter_map(|item| match item {
            MergedItem::Live(l) => Some(l),
            MergedItem::Catalog(_) => None,
        })
    }
}
