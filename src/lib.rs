//! Reviews Warehouse
//!
//! A batch ETL pipeline that rebuilds a small star-schema warehouse from two
//! raw sources on every run:
//!
//! - a nested product catalog (newline-delimited JSON) flattened into a
//!   cleaned row stream, three surrogate-key dimension tables (category,
//!   brand, main category) and a denormalized product fact table
//! - a flat ratings log (headerless CSV) turned into a calendar time
//!   dimension and a ratings fact table
//!
//! Every produced table is persisted as a Snappy-compressed Parquet file set
//! under `{output}/{table}/{partition}`, fully replacing whatever a previous
//! run left at that exact path.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod ratings;
pub mod writer;

pub use config::PipelineConfig;
pub use error::{Result, WarehouseError};
pub use models::{PipelineStats, TableKind};
pub use pipeline::Pipeline;
