//! Parquet table writer.
//!
//! Persists a table to `{base}/{table}/{partition}` as a set of
//! Snappy-compressed Parquet part files with full column statistics. The
//! destination is replaced wholesale: any existing content at that exact
//! path is removed before the first byte is written. A write failure is
//! fatal to the run; there are no retries and no partial-output cleanup.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, ParquetCompression, ParquetWriter, StatisticsOptions};
use tracing::debug;

use crate::error::{Result, WarehouseError};
use crate::models::TableKind;

/// Writes tables under a base output directory.
#[derive(Debug, Clone)]
pub struct TableWriter {
    base: PathBuf,
}

impl TableWriter {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Write `df` to `{base}/{table}/{partition}`, replacing prior content.
    ///
    /// The frame is split into up to `table.file_count()` part files; the
    /// split changes file count only, never read-back content. Returns the
    /// number of rows written.
    pub fn write(&self, df: &DataFrame, table: TableKind, partition: &str) -> Result<usize> {
        let dest = self.base.join(table.dir_name()).join(partition);

        if dest.exists() {
            debug!("Replacing existing table content at {}", dest.display());
            fs::remove_dir_all(&dest).map_err(|e| {
                WarehouseError::table_write(
                    table.dir_name(),
                    dest.clone(),
                    format!("failed to clear existing output: {e}"),
                )
            })?;
        }
        fs::create_dir_all(&dest).map_err(|e| {
            WarehouseError::table_write(
                table.dir_name(),
                dest.clone(),
                format!("failed to create output directory: {e}"),
            )
        })?;

        let rows = df.height();
        let parts = table.file_count().min(rows.max(1));
        let chunk_rows = rows.div_ceil(parts).max(1);

        let mut written = 0usize;
        for part in 0..parts {
            let offset = part * chunk_rows;
            if part > 0 && offset >= rows {
                break;
            }
            let len = chunk_rows.min(rows - offset);
            let slice = df.slice(offset as i64, len);
            self.write_part(slice, table, &dest, part)?;
            written += len;
        }

        debug!(
            "Table '{}' written: {} rows to {}",
            table,
            written,
            dest.display()
        );
        Ok(written)
    }

    fn write_part(
        &self,
        mut part: DataFrame,
        table: TableKind,
        dest: &Path,
        index: usize,
    ) -> Result<()> {
        let path = dest.join(format!("part-{index:05}.parquet"));
        let file = File::create(&path).map_err(|e| {
            WarehouseError::table_write(table.dir_name(), path.clone(), e.to_string())
        })?;

        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .with_statistics(StatisticsOptions::full())
            .finish(&mut part)
            .map_err(|e| {
                WarehouseError::table_write(table.dir_name(), path.clone(), e.to_string())
            })?;
        Ok(())
    }
}
