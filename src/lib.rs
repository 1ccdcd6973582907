//! BundleCraft
//!
//! Fixed product bundles sold as one purchasable variant, expanded back into
//! their component variants when the cart is calculated.
//!
//! ## Features
//! - Cart transform: bundle line → component lines (`cart_transform`)
//! - Bundle catalog management with discount pricing
//! - Variant metafield and storefront offer payloads
//! - Per-shop settings and privacy webhooks

use thiserror::Error;

pub mod api;
pub mod cart_transform;
pub mod config;
pub mod domain;
pub mod publisher;
pub mod service;
pub mod store;

pub use cart_transform::{evaluate, CartTransformInput, CartTransformResult};
pub use config::Config;
pub use service::BundleService;
pub use store::{BundleStore, MemoryStore};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Bundle not found")]
    BundleNotFound,

    #[error("Bundle has no parent variant")]
    NotLinked,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type Result<T> = std::result::Result<T, BundleError>;
