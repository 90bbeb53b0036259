//! Product fact builder.
//!
//! Denormalizes the cleaned catalog against the three dimension tables:
//! each natural-key attribute is swapped for its surrogate key by a left
//! join, `asin` is renamed to `product_id`, and the text natural-key columns
//! are dropped. Left semantics keep every catalog row; a null natural key
//! matches nothing and yields a null surrogate key.

use polars::prelude::*;

use crate::error::Result;

/// Output column order of the product fact table.
pub const PRODUCT_COLUMNS: [&str; 8] = [
    "product_id",
    "title",
    "description",
    "image",
    "price",
    "brand_id",
    "category_id",
    "main_cat_id",
];

/// Build the product fact table from the cleaned catalog and the three
/// dimension tables. Each dimension holds at most one row per distinct value
/// by construction, so the joins never fan out and the output has exactly
/// one row per catalog row.
pub fn build_product_facts(
    catalog: &DataFrame,
    brands: &DataFrame,
    categories: &DataFrame,
    main_categories: &DataFrame,
) -> Result<DataFrame> {
    let facts = catalog
        .clone()
        .lazy()
        .join(
            brands.clone().lazy(),
            [col("brand")],
            [col("brand")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            categories.clone().lazy(),
            [col("category")],
            [col("category")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            main_categories.clone().lazy(),
            [col("main_cat")],
            [col("main_cat")],
            JoinArgs::new(JoinType::Left),
        )
        .select([
            col("asin").alias("product_id"),
            col("title"),
            col("description"),
            col("image"),
            col("price"),
            col("brand_id"),
            col("category_id"),
            col("main_cat_id"),
        ])
        .collect()?;

    Ok(facts)
}
