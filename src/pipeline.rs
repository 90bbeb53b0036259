//! Pipeline orchestration.
//!
//! An explicit context object owns the configuration and the table writer;
//! there is no ambient session. The catalog branch and the ratings branch
//! share no state and run concurrently, as do the three dimension builds
//! within the catalog branch. The product fact build waits on all three
//! dimensions. Any write failure aborts the run; recovery is a full re-run.

use std::sync::Arc;
use std::time::Instant;

use polars::prelude::DataFrame;
use tokio::task;
use tracing::{debug, info};

use crate::catalog::{self, dimensions::DimensionAttr};
use crate::config::PipelineConfig;
use crate::error::{Result, WarehouseError};
use crate::models::{CleanCatalogRow, CleanRatingRow, PipelineStats, TableKind};
use crate::ratings;
use crate::writer::TableWriter;

/// One warehouse build: two input branches, six output tables.
pub struct Pipeline {
    config: PipelineConfig,
    writer: Arc<TableWriter>,
}

struct CatalogOutcome {
    records: usize,
    rows: usize,
    malformed_lines: usize,
    length_mismatches: usize,
    category_rows: usize,
    brand_rows: usize,
    main_category_rows: usize,
    product_rows: usize,
}

struct RatingsOutcome {
    rows: usize,
    time_rows: usize,
    fact_rows: usize,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let writer = Arc::new(TableWriter::new(&config.output_path));
        Self { config, writer }
    }

    /// Run the full build and return per-table statistics.
    pub async fn run(&self) -> Result<PipelineStats> {
        let started = Instant::now();
        info!(
            "Building warehouse under {} (partition '{}')",
            self.config.output_path.display(),
            self.config.partition
        );

        let (catalog, ratings) =
            tokio::try_join!(self.run_catalog_branch(), self.run_ratings_branch())?;

        let stats = PipelineStats {
            catalog_records: catalog.records,
            catalog_rows: catalog.rows,
            malformed_catalog_lines: catalog.malformed_lines,
            array_length_mismatches: catalog.length_mismatches,
            rating_rows: ratings.rows,
            category_rows: catalog.category_rows,
            brand_rows: catalog.brand_rows,
            main_category_rows: catalog.main_category_rows,
            product_rows: catalog.product_rows,
            time_rows: ratings.time_rows,
            ratings_fact_rows: ratings.fact_rows,
            output_path: self.config.output_path.clone(),
            elapsed: started.elapsed(),
        };
        info!(
            "Warehouse build finished in {}ms",
            stats.elapsed.as_millis()
        );
        Ok(stats)
    }

    async fn run_catalog_branch(&self) -> Result<CatalogOutcome> {
        let catalog_path = self.config.catalog_path.clone();
        let (rows, load_stats) = task::spawn_blocking(move || catalog::load_catalog(&catalog_path))
            .await
            .map_err(join_error)??;
        info!(
            "Catalog: {} records expanded to {} cleaned rows",
            load_stats.records_read,
            rows.len()
        );
        let rows = Arc::new(rows);

        let (category, brand, main_category) = tokio::try_join!(
            self.build_dimension_table(Arc::clone(&rows), DimensionAttr::Category),
            self.build_dimension_table(Arc::clone(&rows), DimensionAttr::Brand),
            self.build_dimension_table(Arc::clone(&rows), DimensionAttr::MainCategory),
        )?;
        let category_rows = category.height();
        let brand_rows = brand.height();
        let main_category_rows = main_category.height();

        // Barrier reached: every dimension is built, the fact can resolve keys.
        let writer = Arc::clone(&self.writer);
        let partition = self.config.partition.clone();
        let fact_rows = Arc::clone(&rows);
        let product_rows = task::spawn_blocking(move || -> Result<usize> {
            let catalog_df = catalog::loader::to_dataframe(&fact_rows)?;
            let facts =
                catalog::build_product_facts(&catalog_df, &brand, &category, &main_category)?;
            writer.write(&facts, TableKind::Products, &partition)
        })
        .await
        .map_err(join_error)??;
        debug!("Product facts written: {} rows", product_rows);

        Ok(CatalogOutcome {
            records: load_stats.records_read,
            rows: rows.len(),
            malformed_lines: load_stats.malformed_lines,
            length_mismatches: load_stats.length_mismatches,
            category_rows,
            brand_rows,
            main_category_rows,
            product_rows,
        })
    }

    async fn build_dimension_table(
        &self,
        rows: Arc<Vec<CleanCatalogRow>>,
        attr: DimensionAttr,
    ) -> Result<DataFrame> {
        let writer = Arc::clone(&self.writer);
        let partition = self.config.partition.clone();
        task::spawn_blocking(move || -> Result<DataFrame> {
            let dim = catalog::build_dimension(&rows, attr)?;
            writer.write(&dim, attr.table(), &partition)?;
            debug!("Dimension '{}' written: {} rows", attr.table(), dim.height());
            Ok(dim)
        })
        .await
        .map_err(join_error)?
    }

    async fn run_ratings_branch(&self) -> Result<RatingsOutcome> {
        let ratings_path = self.config.ratings_path.clone();
        let (rows, load_stats) = task::spawn_blocking(move || ratings::load_ratings(&ratings_path))
            .await
            .map_err(join_error)??;
        info!("Ratings: {} rows loaded", load_stats.rows_read);
        let rows = Arc::new(rows);

        let (time_rows, fact_rows) = tokio::try_join!(
            self.build_time_table(Arc::clone(&rows)),
            self.build_ratings_table(Arc::clone(&rows)),
        )?;

        Ok(RatingsOutcome {
            rows: load_stats.rows_read,
            time_rows,
            fact_rows,
        })
    }

    async fn build_time_table(&self, rows: Arc<Vec<CleanRatingRow>>) -> Result<usize> {
        let writer = Arc::clone(&self.writer);
        let partition = self.config.partition.clone();
        task::spawn_blocking(move || -> Result<usize> {
            let dim = ratings::build_time_dimension(&rows)?;
            writer.write(&dim, TableKind::Time, &partition)
        })
        .await
        .map_err(join_error)?
    }

    async fn build_ratings_table(&self, rows: Arc<Vec<CleanRatingRow>>) -> Result<usize> {
        let writer = Arc::clone(&self.writer);
        let partition = self.config.partition.clone();
        task::spawn_blocking(move || -> Result<usize> {
            let facts = ratings::build_ratings_facts(&rows)?;
            writer.write(&facts, TableKind::Ratings, &partition)
        })
        .await
        .map_err(join_error)?
    }
}

fn join_error(e: task::JoinError) -> WarehouseError {
    WarehouseError::Task {
        reason: e.to_string(),
    }
}
