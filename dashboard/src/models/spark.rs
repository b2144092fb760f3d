//! Raw snapshots as returned by the Spark monitoring REST API
//!
//! These are received verbatim from the polling client and never mutated.

use serde::{Deserialize, Deserializer, Serialize};

// Spark serializes SQL ids as numbers while the dashboard keys rows by string
fn deserialize_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n.to_string(),
        NumberOrString::String(s) => s,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlStatus {
    Running,
    Completed,
    Failed,
}

impl SqlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlStatus::Running => "RUNNING",
            SqlStatus::Completed => "COMPLETED",
            SqlStatus::Failed => "FAILED",
        }
    }
}

/// A metric attached to a plan node, value kept as Spark renders it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlMetric {
    pub name: String,
    pub value: String,
}

/// Counters reported by an Iceberg commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcebergCommitMetrics {
    pub total_data_files: u64,
    pub added_data_files: u64,
    pub removed_data_files: u64,
    pub total_records: u64,
    pub added_records: u64,
    pub removed_records: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcebergCommit {
    pub table_name: String,
    pub metrics: IcebergCommitMetrics,
}

/// One operator of a query's physical plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkPlanNode {
    pub node_id: i64,
    pub node_name: String,
    #[serde(default)]
    pub metrics: Vec<SqlMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iceberg_commit: Option<IcebergCommit>,
    /// Physical-plan text of this node, when the poller could attach it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlEdge {
    pub from_id: i64,
    pub to_id: i64,
}

/// IO totals of the stages a query ran, attached by the poller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlStageMetrics {
    pub input_bytes: u64,
    pub output_bytes: u64,
}

/// A SQL execution as polled from `/applications/{id}/sql`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkSql {
    #[serde(deserialize_with = "deserialize_number_or_string")]
    pub id: String,
    pub status: SqlStatus,
    #[serde(default)]
    pub description: String,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub nodes: Vec<SparkPlanNode>,
    #[serde(default)]
    pub edges: Vec<SqlEdge>,
    /// Commands such as `SET` or `CREATE TABLE` rather than data queries
    #[serde(default)]
    pub is_sql_command: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_metrics: Option<SqlStageMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Active,
    Complete,
    Pending,
    Skipped,
    Failed,
}

/// A stage as polled from `/applications/{id}/stages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkStage {
    pub stage_id: i64,
    pub status: StageStatus,
    #[serde(default)]
    pub num_tasks: u64,
    #[serde(default)]
    pub num_active_tasks: u64,
    #[serde(default)]
    pub num_complete_tasks: u64,
    #[serde(default)]
    pub num_failed_tasks: u64,
    #[serde(default)]
    pub input_bytes: u64,
    #[serde(default)]
    pub output_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkRuntime {
    #[serde(default)]
    pub java_version: Option<String>,
    #[serde(default)]
    pub scala_version: Option<String>,
}

/// Environment snapshot from `/applications/{id}/environment`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SparkConfiguration {
    #[serde(default)]
    pub runtime: SparkRuntime,
    #[serde(default)]
    pub spark_properties: Vec<(String, String)>,
    #[serde(default)]
    pub system_properties: Vec<(String, String)>,
}
