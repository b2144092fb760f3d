//! Row model for the SQL table
//!
//! Flattens the enriched store into rows and sorts them by a chosen column.

use super::models::SparkSqlStore;
use crate::models::SqlStatus;
use crate::utils::humanize_time_diff;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortColumn {
    #[default]
    Id,
    Status,
    Description,
    Duration,
    Input,
    Output,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlTableRow {
    pub id: String,
    pub status: SqlStatus,
    pub description: String,
    pub duration: u64,
    pub duration_display: String,
    /// Unset until the poller attached stage totals to the query
    pub input_bytes: Option<u64>,
    pub output_bytes: Option<u64>,
    /// Empty when the query did not fail
    pub failure_reason: String,
}

/// One row per data query; SQL commands are left out
pub fn create_sql_table_data(store: &SparkSqlStore) -> Vec<SqlTableRow> {
    store
        .sqls
        .iter()
        .filter(|sql| !sql.is_sql_command)
        .map(|sql| SqlTableRow {
            id: sql.id.clone(),
            status: sql.status,
            description: sql.description.clone(),
            duration: sql.duration,
            duration_display: humanize_time_diff(sql.duration),
            input_bytes: sql.stage_metrics.map(|m| m.input_bytes),
            output_bytes: sql.stage_metrics.map(|m| m.output_bytes),
            failure_reason: sql.failure_reason.clone().unwrap_or_default(),
        })
        .collect()
}

// Numeric ids first in numeric order, then everything else in text order
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn compare(a: &SqlTableRow, b: &SqlTableRow, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Id => compare_ids(&a.id, &b.id),
        SortColumn::Status => a.status.as_str().cmp(b.status.as_str()),
        SortColumn::Description => a.description.cmp(&b.description),
        SortColumn::Duration => a.duration.cmp(&b.duration),
        SortColumn::Input => a.input_bytes.cmp(&b.input_bytes),
        SortColumn::Output => a.output_bytes.cmp(&b.output_bytes),
    }
}

/// Stable sort: rows with equal keys keep their relative order
pub fn sort_rows(rows: &mut [SqlTableRow], column: SortColumn, order: Order) {
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, column);
        match order {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        }
    });
}
