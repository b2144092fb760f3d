//! Derived dashboard data models
//!
//! Enriched views computed from raw Spark snapshots. Equality on these types is
//! derived field by field and drives change detection: an absent optional field
//! is `None` on both sides, so "missing" and "undefined" compare equal.

use crate::models::{IcebergCommit, SparkSql, SqlEdge, SqlMetric, SqlStageMetrics, SqlStatus};
use crate::utils::human_file_size;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Plan Parsing
// ============================================================================

/// Fields scraped from a file-scan or write node's plan text
///
/// Every field is optional and `None` has a fixed meaning:
/// - `format`, `location`: the pattern did not match
/// - `partition_filters`, `pushed_filters`, `read_schema`: no match, or the
///   upstream list was truncated with `...` and cannot be trusted
/// - `table_name`: the node name is not exactly three space-separated tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFileScanPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_filters: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed_filters: Option<Vec<String>>,
    /// Field name to type, in schema order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_schema: Option<Vec<(String, String)>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl ParsedFileScanPlan {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Look up a column type in the read schema
    pub fn schema_type(&self, column: &str) -> Option<&str> {
        self.read_schema
            .as_ref()?
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, ty)| ty.as_str())
    }
}

// ============================================================================
// Node Classification
// ============================================================================

/// Node category for graph rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Input,
    Output,
    Join,
    Transformation,
    Other,
}

impl Default for NodeType {
    fn default() -> Self {
        NodeType::Other
    }
}

/// A plan node after classification and metric filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSqlNode {
    pub node_id: i64,
    pub node_name: String,
    pub node_type: NodeType,
    pub is_visible: bool,
    /// Allow-listed metrics only, in original order
    pub metrics: Vec<SqlMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iceberg_commit: Option<IcebergCommit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_plan: Option<ParsedFileScanPlan>,
}

/// A SQL execution with its nodes enriched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSparkSql {
    pub id: String,
    pub status: SqlStatus,
    pub description: String,
    pub duration: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub nodes: Vec<EnrichedSqlNode>,
    pub edges: Vec<SqlEdge>,
    pub is_sql_command: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_metrics: Option<SqlStageMetrics>,
}

impl EnrichedSparkSql {
    pub(crate) fn from_raw(sql: &SparkSql, nodes: Vec<EnrichedSqlNode>) -> Self {
        Self {
            id: sql.id.clone(),
            status: sql.status,
            description: sql.description.clone(),
            duration: sql.duration,
            failure_reason: sql.failure_reason.clone(),
            nodes,
            edges: sql.edges.clone(),
            is_sql_command: sql.is_sql_command,
            stage_metrics: sql.stage_metrics,
        }
    }

    pub fn output_node(&self) -> Option<&EnrichedSqlNode> {
        self.nodes.iter().find(|n| n.node_type == NodeType::Output)
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &EnrichedSqlNode> {
        self.nodes.iter().filter(|n| n.is_visible)
    }
}

/// Enriched SQL executions in polling order
///
/// Entries are shared by `Arc` so unchanged history keeps its identity across
/// reconciliations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparkSqlStore {
    pub sqls: Vec<Arc<EnrichedSparkSql>>,
}

impl SparkSqlStore {
    pub fn len(&self) -> usize {
        self.sqls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sqls.is_empty()
    }

    pub fn last(&self) -> Option<&Arc<EnrichedSparkSql>> {
        self.sqls.last()
    }
}

// ============================================================================
// Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    Idle,
    Working,
}

/// Aggregated task and IO counters over non-skipped stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStore {
    pub total_active_tasks: u64,
    pub total_pending_tasks: u64,
    pub total_input_bytes: u64,
    pub total_output_bytes: u64,
    pub status: AppStatus,
}

impl StatusStore {
    pub fn total_input_display(&self) -> String {
        human_file_size(self.total_input_bytes)
    }

    pub fn total_output_display(&self) -> String {
        human_file_size(self.total_output_bytes)
    }

    pub fn is_idle(&self) -> bool {
        self.status == AppStatus::Idle
    }
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Warning = 1,
    Error = 2,
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warning" => Ok(AlertType::Warning),
            "error" => Ok(AlertType::Error),
            other => Err(format!("unknown alert type: {}", other)),
        }
    }
}

/// Where an alert points back to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AlertSource {
    #[serde(rename_all = "camelCase")]
    Sql { sql_id: String, sql_node_id: i64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// `<name>_<sqlId>_<nodeId>`, at most one alert per rule per node
    pub id: String,
    pub name: String,
    pub title: String,
    pub location: String,
    pub message: String,
    pub suggestion: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub source: AlertSource,
}

pub type Alerts = Vec<Alert>;
