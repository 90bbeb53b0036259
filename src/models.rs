//! Core data structures for the warehouse build.
//!
//! Defines the cleaned row types produced by the two loaders, the set of
//! output tables, and the statistics reported at the end of a run.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Output tables produced by one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Category,
    Brand,
    MainCategory,
    Products,
    Time,
    Ratings,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::Category,
        TableKind::Brand,
        TableKind::MainCategory,
        TableKind::Products,
        TableKind::Time,
        TableKind::Ratings,
    ];

    /// Directory name for this table under the output base path.
    pub fn dir_name(&self) -> &'static str {
        match self {
            TableKind::Category => "category",
            TableKind::Brand => "brand",
            TableKind::MainCategory => "main_category",
            TableKind::Products => "products",
            TableKind::Time => "time",
            TableKind::Ratings => "ratings",
        }
    }

    /// Target number of Parquet part files for this table.
    ///
    /// A tunable with no effect on read-back content, only on file count.
    /// Fact tables get more parts than the small dimension tables.
    pub fn file_count(&self) -> usize {
        match self {
            TableKind::Products | TableKind::Ratings => 10,
            _ => 5,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// One flattened, cleaned catalog row.
///
/// A raw catalog record carries three parallel arrays (category, description,
/// image); position `i` across them describes one sub-entity, so a record
/// expands to one row per aligned tuple. All text fields have had the raw
/// feed's null sentinels (`"null"`, `""`, `"None"`) normalized to true nulls.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanCatalogRow {
    pub asin: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub title: Option<String>,
    pub brand: Option<String>,
    pub main_cat: Option<String>,
    pub price: Option<f64>,
}

/// One cleaned ratings row.
///
/// `start_time` is the epoch second rendered as `YYYY-MM-DD HH:MM:SS` in the
/// local time zone of the executing process; it is null when the timestamp
/// failed to parse.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRatingRow {
    pub reviewer_id: Option<String>,
    pub product_id: Option<String>,
    pub rating: Option<f64>,
    pub timestamp: Option<i64>,
    pub start_time: Option<String>,
}

/// Statistics for one complete pipeline run.
#[derive(Debug, Default, Clone)]
pub struct PipelineStats {
    /// Raw catalog records read (excluding malformed lines)
    pub catalog_records: usize,
    /// Cleaned catalog rows after parallel-array expansion
    pub catalog_rows: usize,
    /// Catalog lines skipped because they were not valid JSON
    pub malformed_catalog_lines: usize,
    /// Catalog records whose parallel arrays disagreed on length
    pub array_length_mismatches: usize,
    /// Ratings rows read from the CSV source
    pub rating_rows: usize,
    pub category_rows: usize,
    pub brand_rows: usize,
    pub main_category_rows: usize,
    pub product_rows: usize,
    pub time_rows: usize,
    pub ratings_fact_rows: usize,
    pub output_path: PathBuf,
    pub elapsed: Duration,
}

impl PipelineStats {
    /// Per-table row counts in output-directory order.
    pub fn table_rows(&self) -> [(TableKind, usize); 6] {
        [
            (TableKind::Category, self.category_rows),
            (TableKind::Brand, self.brand_rows),
            (TableKind::MainCategory, self.main_category_rows),
            (TableKind::Products, self.product_rows),
            (TableKind::Time, self.time_rows),
            (TableKind::Ratings, self.ratings_fact_rows),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_dir_names_match_output_layout() {
        let names: Vec<&str> = TableKind::ALL.iter().map(|t| t.dir_name()).collect();
        assert_eq!(
            names,
            ["category", "brand", "main_category", "products", "time", "ratings"]
        );
    }

    #[test]
    fn fact_tables_split_into_more_files_than_dimensions() {
        assert_eq!(TableKind::Products.file_count(), 10);
        assert_eq!(TableKind::Ratings.file_count(), 10);
        assert_eq!(TableKind::Brand.file_count(), 5);
        assert_eq!(TableKind::Time.file_count(), 5);
    }
}
