//! # Catalog Common Library
//!
//! Shared code for the live catalog service:
//! - Product and live submission models
//! - View merging (catalog followed by live submissions)
//! - Field validation for caller-supplied records
//! - Push channel wire messages
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;
pub mod merge;
pub mod models;
pub mod validation;

pub use error::{Error, Result};
pub use merge::merge;
pub use models::{LiveSubmission, MergedItem, MergedView, Product};
pub use validation::ValidationError;
