//! variant-gallery: per-option image mapping for product galleries.
//!
//! The crate normalizes persisted option → image mappings (including the
//! legacy variant-keyed format) against a product's live catalog data, and
//! decides which gallery images a storefront shows for the selected variant.

pub mod api;
pub mod core;
pub mod error;
pub mod gallery;
pub mod interaction;
pub mod telemetry;

pub use api::{GalleryEngine, GalleryEngineConfig, StorefrontBootstrap};
pub use crate::core::{CanonicalMapping, Settings, normalize_mapping, normalize_settings};
pub use error::{GalleryError, GalleryResult};
