//! Ratings branch: the flat ratings log into time dimension and fact tables.

pub mod facts;
pub mod loader;
pub mod time_dim;

pub use facts::build_ratings_facts;
pub use loader::{RatingsStats, load_ratings};
pub use time_dim::build_time_dimension;
