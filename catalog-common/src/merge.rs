//! View merging
//!
//! The single definition of what every connected viewer sees: the catalog in
//! store order followed by the live submissions in store order. Pure, no I/O;
//! callers re-read both stores before every call.

use crate::models::{LiveSubmission, MergedItem, MergedView, Product};

/// Concatenate catalog products and live submissions into one view
pub fn merge(products: Vec<Product>, live: Vec<LiveSubmission>) -> MergedView {
    let mut items = Vec::with_capacity(products.len() + live.len());
    items.extend(products.into_iter().map(MergedItem::Catalog));
    items.extend(live.into_iter().map(MergedItem::Live));
    MergedView::from_items(items)
}
