//! Pipeline configuration.
//!
//! The run is driven by four inputs: a catalog path, a ratings path, an
//! output base path, and a partition key used as a path segment under each
//! table directory. Each can come from a CLI flag or fall back to an
//! environment variable. Validation happens before any processing starts;
//! a missing or invalid input is fatal at startup.

use std::env;
use std::path::PathBuf;

use crate::error::{Result, WarehouseError};
use crate::models::TableKind;

/// Environment fallback for the catalog (nested JSON) input path.
pub const ENV_CATALOG_PATH: &str = "INPUT_JSON_PATH";
/// Environment fallback for the ratings (flat CSV) input path.
pub const ENV_RATINGS_PATH: &str = "INPUT_CSV_PATH";
/// Environment fallback for the output base path.
pub const ENV_OUTPUT_PATH: &str = "OUTPUT_PATH";
/// Environment fallback for the partition key.
pub const ENV_PARTITION: &str = "OUTPUT_PARTITION";

/// Resolved configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Newline-delimited JSON product catalog
    pub catalog_path: PathBuf,
    /// Headerless positional CSV ratings log
    pub ratings_path: PathBuf,
    /// Base directory receiving one subdirectory per table
    pub output_path: PathBuf,
    /// Caller-supplied path segment grouping this run's output
    pub partition: String,
}

impl PipelineConfig {
    /// Resolve configuration from explicit values with environment fallback.
    pub fn resolve(
        catalog_path: Option<PathBuf>,
        ratings_path: Option<PathBuf>,
        output_path: Option<PathBuf>,
        partition: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            catalog_path: resolve_path(catalog_path, ENV_CATALOG_PATH, "catalog input")?,
            ratings_path: resolve_path(ratings_path, ENV_RATINGS_PATH, "ratings input")?,
            output_path: resolve_path(output_path, ENV_OUTPUT_PATH, "output base")?,
            partition: match partition {
                Some(partition) => partition,
                None => env::var(ENV_PARTITION).map_err(|_| {
                    WarehouseError::configuration(format!(
                        "partition key missing: pass --partition or set {ENV_PARTITION}"
                    ))
                })?,
            },
        })
    }

    /// Validate the configuration before any processing begins.
    pub fn validate(&self) -> Result<()> {
        for path in [&self.catalog_path, &self.ratings_path] {
            if !path.is_file() {
                return Err(WarehouseError::InputNotFound { path: path.clone() });
            }
        }

        if self.partition.is_empty() {
            return Err(WarehouseError::configuration("partition key is empty"));
        }
        if self.partition.contains(['/', '\\']) || self.partition == "." || self.partition == ".." {
            return Err(WarehouseError::configuration(format!(
                "partition key '{}' is not a valid path segment",
                self.partition
            )));
        }

        Ok(())
    }

    /// Destination directory for one table under this run's partition.
    pub fn table_path(&self, table: TableKind) -> PathBuf {
        self.output_path
            .join(table.dir_name())
            .join(&self.partition)
    }
}

fn resolve_path(explicit: Option<PathBuf>, env_key: &str, what: &str) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => env::var(env_key).map(PathBuf::from).map_err(|_| {
            WarehouseError::configuration(format!(
                "{what} path missing: pass the flag or set {env_key}"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "x").unwrap();
        path
    }

    #[test]
    fn resolves_from_explicit_values() {
        let config = PipelineConfig::resolve(
            Some(PathBuf::from("meta.json")),
            Some(PathBuf::from("ratings.csv")),
            Some(PathBuf::from("out")),
            Some("2021-01".to_string()),
        )
        .unwrap();
        assert_eq!(config.partition, "2021-01");
        assert_eq!(
            config.table_path(TableKind::MainCategory),
            PathBuf::from("out/main_category/2021-01")
        );
    }

    // Single test covers both the missing and the env-fallback case so the
    // process-global variables are never touched from two threads.
    #[test]
    fn falls_back_to_environment() {
        unsafe {
            env::remove_var(ENV_PARTITION);
        }
        let missing = PipelineConfig::resolve(
            Some(PathBuf::from("meta.json")),
            Some(PathBuf::from("ratings.csv")),
            Some(PathBuf::from("out")),
            None,
        );
        assert!(matches!(
            missing,
            Err(WarehouseError::Configuration { .. })
        ));

        unsafe {
            env::set_var(ENV_PARTITION, "batch-7");
        }
        let config = PipelineConfig::resolve(
            Some(PathBuf::from("meta.json")),
            Some(PathBuf::from("ratings.csv")),
            Some(PathBuf::from("out")),
            None,
        )
        .unwrap();
        assert_eq!(config.partition, "batch-7");
        unsafe {
            env::remove_var(ENV_PARTITION);
        }
    }

    #[test]
    fn validate_rejects_missing_inputs() {
        let dir = TempDir::new().unwrap();
        let ratings = touch(&dir, "ratings.csv");
        let config = PipelineConfig {
            catalog_path: dir.path().join("does-not-exist.json"),
            ratings_path: ratings,
            output_path: dir.path().join("out"),
            partition: "p1".to_string(),
        };
        assert!(matches!(
            config.validate(),
            Err(WarehouseError::InputNotFound { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_partition_keys() {
        let dir = TempDir::new().unwrap();
        let catalog = touch(&dir, "meta.json");
        let ratings = touch(&dir, "ratings.csv");
        for bad in ["", "a/b", "a\\b", ".", ".."] {
            let config = PipelineConfig {
                catalog_path: catalog.clone(),
                ratings_path: ratings.clone(),
                output_path: dir.path().join("out"),
                partition: bad.to_string(),
            };
            assert!(config.validate().is_err(), "partition '{bad}' accepted");
        }
    }
}
