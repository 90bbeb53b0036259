//! Catalog loading and cleaning.
//!
//! Reads newline-delimited JSON product records, expands the three parallel
//! arrays (`category`, `description`, `image`) into one row per aligned
//! tuple, and applies the feed's cleaning rules: `&amp;` decoding on the
//! natural-key attributes, a leading `$` strip on price, and normalization of
//! the `"null"` / `""` / `"None"` sentinels to true nulls. No row is ever
//! rejected for a parse failure; a price that does not parse becomes null.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use polars::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Result, WarehouseError};
use crate::models::CleanCatalogRow;

/// One raw product record as it appears in the JSON feed.
#[derive(Debug, Default, Deserialize)]
struct RawCatalogRecord {
    #[serde(default)]
    asin: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    main_cat: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    category: Option<Vec<Option<String>>>,
    #[serde(default)]
    description: Option<Vec<Option<String>>>,
    #[serde(default)]
    image: Option<Vec<Option<String>>>,
}

/// Counters accumulated while loading the catalog.
#[derive(Debug, Default, Clone)]
pub struct CatalogStats {
    pub records_read: usize,
    pub malformed_lines: usize,
    pub length_mismatches: usize,
    pub rows_produced: usize,
}

/// Read and clean the catalog, one `CleanCatalogRow` per aligned array tuple.
///
/// Malformed JSON lines are skipped with a warning and counted; they are
/// never fatal.
pub fn load_catalog(path: &Path) -> Result<(Vec<CleanCatalogRow>, CatalogStats)> {
    if !path.exists() {
        return Err(WarehouseError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    let mut stats = CatalogStats::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RawCatalogRecord = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed catalog record on line {}: {}", line_no + 1, e);
                stats.malformed_lines += 1;
                continue;
            }
        };
        stats.records_read += 1;
        expand_record(record, &mut rows, &mut stats);
    }

    stats.rows_produced = rows.len();
    debug!(
        "Catalog loaded: {} records expanded to {} rows ({} malformed lines, {} length mismatches)",
        stats.records_read, stats.rows_produced, stats.malformed_lines, stats.length_mismatches
    );

    Ok((rows, stats))
}

/// Expand one record's parallel arrays into cleaned rows.
///
/// A record missing any of the three arrays expands to nothing, and arrays
/// that disagree on length are zipped to the shortest one; no position is
/// fabricated that the input arrays do not all describe.
fn expand_record(
    record: RawCatalogRecord,
    rows: &mut Vec<CleanCatalogRow>,
    stats: &mut CatalogStats,
) {
    let (Some(categories), Some(descriptions), Some(images)) =
        (record.category, record.description, record.image)
    else {
        return;
    };

    let len = categories.len().min(descriptions.len()).min(images.len());
    if categories.len() != descriptions.len() || descriptions.len() != images.len() {
        warn!(
            "Parallel array length mismatch for asin {:?} (category={}, description={}, image={}); zipping to {}",
            record.asin,
            categories.len(),
            descriptions.len(),
            images.len(),
            len
        );
        stats.length_mismatches += 1;
    }

    let asin = clean_text(record.asin);
    let title = clean_text(record.title);
    let brand = clean_attribute(record.brand);
    let main_cat = clean_attribute(record.main_cat);
    let price = parse_price(record.price);

    for i in 0..len {
        rows.push(CleanCatalogRow {
            asin: asin.clone(),
            category: clean_attribute(categories[i].clone()),
            description: clean_text(descriptions[i].clone()),
            image: clean_text(images[i].clone()),
            title: title.clone(),
            brand: brand.clone(),
            main_cat: main_cat.clone(),
            price,
        });
    }
}

/// Normalize the feed's textual null sentinels to a true null.
fn clean_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !matches!(v.as_str(), "null" | "" | "None"))
}

/// Sentinel normalization plus `&amp;` decoding for the natural-key
/// attributes (brand, category, main_cat). This is a fixed substring
/// replacement, not general HTML-entity decoding.
fn clean_attribute(value: Option<String>) -> Option<String> {
    clean_text(value).map(|v| v.replace("&amp;", "&"))
}

/// Strip a leading `$` and parse; anything unparsable becomes null.
fn parse_price(value: Option<String>) -> Option<f64> {
    let raw = clean_text(value)?;
    let raw = raw.trim();
    raw.strip_prefix('$').unwrap_or(raw).parse::<f64>().ok()
}

/// Materialize cleaned rows as a DataFrame for joining and persistence.
pub fn to_dataframe(rows: &[CleanCatalogRow]) -> Result<DataFrame> {
    let mut asin: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut category: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut description: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut image: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut title: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut brand: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut main_cat: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut price: Vec<Option<f64>> = Vec::with_capacity(rows.len());

    for row in rows {
        asin.push(row.asin.clone());
        category.push(row.category.clone());
        description.push(row.description.clone());
        image.push(row.image.clone());
        title.push(row.title.clone());
        brand.push(row.brand.clone());
        main_cat.push(row.main_cat.clone());
        price.push(row.price);
    }

    let df = df!(
        "asin" => asin,
        "category" => category,
        "description" => description,
        "image" => image,
        "title" => title,
        "brand" => brand,
        "main_cat" => main_cat,
        "price" => price,
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn expand_json(line: &str) -> (Vec<CleanCatalogRow>, CatalogStats) {
        let record: RawCatalogRecord = serde_json::from_str(line).unwrap();
        let mut rows = Vec::new();
        let mut stats = CatalogStats::default();
        expand_record(record, &mut rows, &mut stats);
        (rows, stats)
    }

    #[test]
    fn expands_one_row_per_aligned_tuple() {
        let (rows, _) = expand_json(
            r#"{"asin":"B1","category":["Toys","Games"],"description":["d1","d2"],
                "image":["i1","i2"],"brand":"Acme &amp; Co","main_cat":"Toys","price":"$9.99","title":"t"}"#,
        );
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.asin.as_deref(), Some("B1"));
            assert_eq!(row.brand.as_deref(), Some("Acme & Co"));
            assert_eq!(row.main_cat.as_deref(), Some("Toys"));
            assert_eq!(row.price, Some(9.99));
        }
        assert_eq!(rows[0].category.as_deref(), Some("Toys"));
        assert_eq!(rows[0].description.as_deref(), Some("d1"));
        assert_eq!(rows[1].image.as_deref(), Some("i2"));
    }

    #[test]
    fn sentinel_values_become_null() {
        let (rows, _) = expand_json(
            r#"{"asin":"B2","category":["null"],"description":[""],"image":["None"],
                "brand":"None","main_cat":"","price":"null","title":"null"}"#,
        );
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.category, None);
        assert_eq!(row.description, None);
        assert_eq!(row.image, None);
        assert_eq!(row.brand, None);
        assert_eq!(row.main_cat, None);
        assert_eq!(row.title, None);
        assert_eq!(row.price, None);
    }

    #[test]
    fn unparsable_price_becomes_null_without_dropping_the_row() {
        let (rows, _) = expand_json(
            r#"{"asin":"B3","category":["c"],"description":["d"],"image":["i"],"price":"$12,99"}"#,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, None);
    }

    #[test]
    fn empty_or_missing_arrays_expand_to_nothing() {
        let (rows, _) =
            expand_json(r#"{"asin":"B4","category":[],"description":[],"image":[]}"#);
        assert!(rows.is_empty());

        let (rows, _) = expand_json(r#"{"asin":"B5","category":["c"],"description":["d"]}"#);
        assert!(rows.is_empty());
    }

    #[test]
    fn mismatched_arrays_zip_to_the_shortest() {
        let (rows, stats) = expand_json(
            r#"{"asin":"B6","category":["a","b","c"],"description":["d1"],"image":["i1","i2"]}"#,
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(stats.length_mismatches, 1);
    }

    #[test]
    fn null_array_elements_survive_as_nulls() {
        let (rows, _) = expand_json(
            r#"{"asin":"B7","category":["c1",null],"description":[null,"d2"],"image":["i1","i2"]}"#,
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].category, None);
        assert_eq!(rows[0].description, None);
    }

    #[test]
    fn malformed_lines_are_skipped_and_counted() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"asin":"B1","category":["c"],"description":["d"],"image":["i"]}}"#)
            .unwrap();
        writeln!(file, "not json at all").unwrap();
        writeln!(file, r#"{{"asin":"B2","category":["c"],"description":["d"],"image":["i"]}}"#)
            .unwrap();

        let (rows, stats) = load_catalog(file.path()).unwrap();
        assert_eq!(stats.records_read, 2);
        assert_eq!(stats.malformed_lines, 1);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_input_is_fatal() {
        let result = load_catalog(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(WarehouseError::InputNotFound { .. })));
    }

    #[test]
    fn dataframe_keeps_schema_for_empty_input() {
        let df = to_dataframe(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 8);
        assert!(df.column("price").unwrap().dtype().is_float());
    }
}
