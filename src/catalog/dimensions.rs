//! Surrogate-key dimension builders.
//!
//! Each of the three natural-key attributes of the cleaned catalog gets its
//! own dimension table: distinct non-null values, sorted ascending, numbered
//! densely from 1. Keys are stable only within a single run; a re-run
//! reassigns them from the current distinct-value order.

use std::collections::BTreeSet;

use polars::prelude::*;

use crate::error::Result;
use crate::models::{CleanCatalogRow, TableKind};

/// Catalog attributes that are normalized into dimension tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionAttr {
    Category,
    Brand,
    MainCategory,
}

impl DimensionAttr {
    pub const ALL: [DimensionAttr; 3] = [
        DimensionAttr::Category,
        DimensionAttr::Brand,
        DimensionAttr::MainCategory,
    ];

    /// Natural-key column name in the cleaned catalog.
    pub fn column(&self) -> &'static str {
        match self {
            DimensionAttr::Category => "category",
            DimensionAttr::Brand => "brand",
            DimensionAttr::MainCategory => "main_cat",
        }
    }

    /// Surrogate-key column name contributed to the product fact table.
    pub fn id_column(&self) -> &'static str {
        match self {
            DimensionAttr::Category => "category_id",
            DimensionAttr::Brand => "brand_id",
            DimensionAttr::MainCategory => "main_cat_id",
        }
    }

    /// Output table receiving this dimension.
    pub fn table(&self) -> TableKind {
        match self {
            DimensionAttr::Category => TableKind::Category,
            DimensionAttr::Brand => TableKind::Brand,
            DimensionAttr::MainCategory => TableKind::MainCategory,
        }
    }

    fn value<'a>(&self, row: &'a CleanCatalogRow) -> Option<&'a str> {
        match self {
            DimensionAttr::Category => row.category.as_deref(),
            DimensionAttr::Brand => row.brand.as_deref(),
            DimensionAttr::MainCategory => row.main_cat.as_deref(),
        }
    }
}

/// Build the dimension table for one attribute.
///
/// The ordered set gives deduplication and the ascending byte-order sort in
/// one pass; enumeration from 1 then yields dense, gap-free surrogate keys
/// whose order matches the lexicographic order of the values.
pub fn build_dimension(rows: &[CleanCatalogRow], attr: DimensionAttr) -> Result<DataFrame> {
    let distinct: BTreeSet<&str> = rows.iter().filter_map(|row| attr.value(row)).collect();
    let values: Vec<&str> = distinct.into_iter().collect();
    let ids: Vec<i32> = (1..=values.len() as i32).collect();

    let df = df!(
        attr.column() => values,
        attr.id_column() => ids,
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: Option<&str>, brand: Option<&str>, main_cat: Option<&str>) -> CleanCatalogRow {
        CleanCatalogRow {
            asin: Some("A".to_string()),
            category: category.map(str::to_string),
            description: None,
            image: None,
            title: None,
            brand: brand.map(str::to_string),
            main_cat: main_cat.map(str::to_string),
            price: None,
        }
    }

    #[test]
    fn keys_are_dense_and_follow_sorted_value_order() {
        let rows = vec![
            row(Some("Toys"), None, None),
            row(Some("Books"), None, None),
            row(Some("Games"), None, None),
            row(Some("Books"), None, None),
        ];
        let dim = build_dimension(&rows, DimensionAttr::Category).unwrap();
        assert_eq!(dim.height(), 3);

        let values = dim.column("category").unwrap().str().unwrap();
        let ids = dim.column("category_id").unwrap().i32().unwrap();
        let pairs: Vec<(&str, i32)> = (0..dim.height())
            .map(|i| (values.get(i).unwrap(), ids.get(i).unwrap()))
            .collect();
        assert_eq!(pairs, vec![("Books", 1), ("Games", 2), ("Toys", 3)]);
    }

    #[test]
    fn nulls_are_excluded() {
        let rows = vec![row(None, Some("Acme"), None), row(None, None, None)];
        let dim = build_dimension(&rows, DimensionAttr::Brand).unwrap();
        assert_eq!(dim.height(), 1);
        assert_eq!(
            dim.column("brand").unwrap().str().unwrap().get(0),
            Some("Acme")
        );
    }

    #[test]
    fn sort_is_case_sensitive_byte_order() {
        let rows = vec![
            row(None, None, Some("apple")),
            row(None, None, Some("Banana")),
            row(None, None, Some("Apple")),
        ];
        let dim = build_dimension(&rows, DimensionAttr::MainCategory).unwrap();
        let values = dim.column("main_cat").unwrap().str().unwrap();
        let ordered: Vec<&str> = (0..3).map(|i| values.get(i).unwrap()).collect();
        // Uppercase sorts before lowercase in byte order.
        assert_eq!(ordered, vec!["Apple", "Banana", "apple"]);
    }

    #[test]
    fn empty_input_yields_empty_dimension() {
        let dim = build_dimension(&[], DimensionAttr::Category).unwrap();
        assert_eq!(dim.height(), 0);
        assert_eq!(dim.width(), 2);
    }
}
