//! Spark Dashboard Analyzer
//!
//! Derives everything the dashboard renders from polled Spark snapshots.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    spark_api_reducer()                       │
//! │                           │                                  │
//! │       ┌───────────────────┼────────────────────┐             │
//! │       ▼                   ▼                    ▼             │
//! │  ┌──────────┐      ┌─────────────┐      ┌─────────────┐      │
//! │  │Reconciler│      │ Classifier  │      │   Alerts    │      │
//! │  │ SqlStore │─────▶│  NodeType   │─────▶│ AlertEngine │      │
//! │  │ Status   │      │  Metrics    │      │ Iceberg     │      │
//! │  └──────────┘      └──────┬──────┘      └─────────────┘      │
//! │                           ▼                                  │
//! │                    ┌─────────────┐                           │
//! │                    │   Parser    │                           │
//! │                    │  FileScan   │                           │
//! │                    └─────────────┘                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use spark_dashboard::services::spark_analyzer::{spark_api_reducer, AlertEngine, ApiAction, AppStore};
//! use std::sync::Arc;
//!
//! let engine = AlertEngine::new();
//! let state = Arc::new(AppStore::default());
//! let next = spark_api_reducer(&state, ApiAction::SetSql { value: sqls }, &engine)?;
//! if !Arc::ptr_eq(&state, &next) {
//!     // re-render
//! }
//! ```

pub mod alerts;
pub mod classifier;
pub mod models;
pub mod parser;
pub mod reconciler;
pub mod store;
pub mod table;

#[cfg(test)]
mod tests;

pub use alerts::{AlertEngine, AlertEngineConfig};
pub use classifier::{calculate_sql, calculate_sqls};
pub use models::*;
pub use parser::{parse_file_scan, PlanParser};
pub use reconciler::{calculate_sql_store, calculate_status};
pub use store::{spark_api_reducer, ApiAction, AppStore};
pub use table::{create_sql_table_data, sort_rows, Order, SortColumn, SqlTableRow};

use crate::models::SparkSql;
use std::sync::Arc;

/// Result of a one-shot analysis over a full query list
#[derive(Debug, Clone, serde::Serialize)]
pub struct SqlAnalysis {
    pub store: Arc<SparkSqlStore>,
    pub alerts: Alerts,
}

/// Enrich a complete query list and evaluate alerts on it
///
/// Convenience entry for callers that do not keep state between polls.
pub fn analyze_sqls(sqls: &[SparkSql], engine: &AlertEngine) -> SqlAnalysis {
    let store = Arc::new(SparkSqlStore {
        sqls: calculate_sqls(sqls).into_iter().map(Arc::new).collect(),
    });
    let alerts = engine.analyze(&store);
    SqlAnalysis { store, alerts }
}
