//! SQL store reconciliation
//!
//! Queries arrive append-only; only the newest one keeps changing while it
//! runs. History is carried over by `Arc` and only the tail is re-enriched.

use crate::models::SparkSql;
use crate::services::spark_analyzer::classifier::{calculate_sql, calculate_sqls};
use crate::services::spark_analyzer::models::SparkSqlStore;
use crate::utils::{AnalyzerError, AnalyzerResult};
use std::sync::Arc;
use tracing::debug;

/// Reconcile the latest polled SQL list against the current store
///
/// - no store: enrich everything
/// - same length: re-enrich the last query, keep the store if it is unchanged
/// - longer: keep `0..N-1`, re-enrich from the previous last index onwards
/// - shorter: rejected, the caller broke the append-only contract
pub fn calculate_sql_store(
    current: Option<&Arc<SparkSqlStore>>,
    sqls: &[SparkSql],
) -> AnalyzerResult<Arc<SparkSqlStore>> {
    let Some(current) = current else {
        debug!("Building SQL store from {} queries", sqls.len());
        return Ok(Arc::new(SparkSqlStore {
            sqls: calculate_sqls(sqls).into_iter().map(Arc::new).collect(),
        }));
    };

    let previous_len = current.len();
    if sqls.len() < previous_len {
        return Err(AnalyzerError::query_list_shrank(previous_len, sqls.len()));
    }

    if sqls.len() == previous_len {
        let (Some(last_raw), Some(last_enriched)) = (sqls.last(), current.last()) else {
            return Ok(Arc::clone(current));
        };

        let updated = calculate_sql(last_raw);
        if updated == **last_enriched {
            return Ok(Arc::clone(current));
        }

        debug!("SQL {} changed, replacing last store entry", updated.id);
        let mut entries = current.sqls.clone();
        if let Some(slot) = entries.last_mut() {
            *slot = Arc::new(updated);
        }
        return Ok(Arc::new(SparkSqlStore { sqls: entries }));
    }

    // The previous last entry may have finished since the last poll
    let boundary = previous_len.saturating_sub(1);
    debug!(
        "SQL store grew from {} to {} queries, re-enriching from index {}",
        previous_len,
        sqls.len(),
        boundary
    );
    let mut entries: Vec<_> = current.sqls[..boundary].to_vec();
    entries.extend(calculate_sqls(&sqls[boundary..]).into_iter().map(Arc::new));

    Ok(Arc::new(SparkSqlStore { sqls: entries }))
}
