//! Catalog branch: nested product records into dimension and fact tables.
//!
//! The loader flattens and cleans the raw JSON feed, the dimension builders
//! assign surrogate keys to the three natural-key attributes, and the product
//! fact builder denormalizes the cleaned rows against those dimensions.

pub mod dimensions;
pub mod loader;
pub mod products;

pub use dimensions::{DimensionAttr, build_dimension};
pub use loader::{CatalogStats, load_catalog};
pub use products::build_product_facts;
