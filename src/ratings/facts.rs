//! Ratings fact builder: a pure projection of the cleaned ratings.

use polars::prelude::*;

use crate::error::Result;
use crate::models::CleanRatingRow;

/// Project the cleaned ratings into the fact shape. No deduplication, no
/// filtering; output row count equals input row count.
pub fn build_ratings_facts(rows: &[CleanRatingRow]) -> Result<DataFrame> {
    let mut reviewer_ids: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut product_ids: Vec<Option<String>> = Vec::with_capacity(rows.len());
    let mut ratings: Vec<Option<f64>> = Vec::with_capacity(rows.len());
    let mut start_times: Vec<Option<String>> = Vec::with_capacity(rows.len());

    for row in rows {
        reviewer_ids.push(row.reviewer_id.clone());
        product_ids.push(row.product_id.clone());
        ratings.push(row.rating);
        start_times.push(row.start_time.clone());
    }

    let df = df!(
        "reviewer_id" => reviewer_ids,
        "product_id" => product_ids,
        "rating" => ratings,
        "start_time" => start_times,
    )?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_preserves_row_count_and_duplicates() {
        let row = CleanRatingRow {
            reviewer_id: Some("u1".to_string()),
            product_id: Some("B1".to_string()),
            rating: Some(4.5),
            timestamp: Some(1609459200),
            start_time: Some("2021-01-01 00:00:00".to_string()),
        };
        let rows = vec![row.clone(), row.clone(), row];
        let facts = build_ratings_facts(&rows).unwrap();
        assert_eq!(facts.height(), 3);

        let columns: Vec<&str> = facts
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(columns, ["reviewer_id", "product_id", "rating", "start_time"]);
    }

    #[test]
    fn null_fields_carry_through() {
        let rows = vec![CleanRatingRow {
            reviewer_id: None,
            product_id: Some("B1".to_string()),
            rating: None,
            timestamp: None,
            start_time: None,
        }];
        let facts = build_ratings_facts(&rows).unwrap();
        assert_eq!(facts.height(), 1);
        assert_eq!(facts.column("rating").unwrap().f64().unwrap().get(0), None);
        assert_eq!(
            facts.column("start_time").unwrap().str().unwrap().get(0),
            None
        );
    }
}
