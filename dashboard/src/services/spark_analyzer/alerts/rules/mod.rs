//! Alert rules
//!
//! Each rule inspects one node of one query and emits at most one alert.

pub mod iceberg;

use crate::services::spark_analyzer::models::*;

// ============================================================================
// Rule Trait and Types
// ============================================================================

/// Context for rule evaluation
pub struct RuleContext<'a> {
    pub sql: &'a EnrichedSparkSql,
    pub node: &'a EnrichedSqlNode,
}

impl<'a> RuleContext<'a> {
    /// `In: SQL query "<description>" (id: <id>) and node "<name>"`
    pub fn location(&self) -> String {
        format!(
            "In: SQL query \"{}\" (id: {}) and node \"{}\"",
            self.sql.description, self.sql.id, self.node.node_name
        )
    }

    /// Deterministic alert id, one per rule per node
    pub fn alert_id(&self, rule_name: &str) -> String {
        format!("{}_{}_{}", rule_name, self.sql.id, self.node.node_id)
    }

    pub fn source(&self) -> AlertSource {
        AlertSource::Sql {
            sql_id: self.sql.id.clone(),
            sql_node_id: self.node.node_id,
        }
    }
}

/// Trait for alert rules
pub trait AlertRule: Send + Sync {
    /// Rule family id
    fn id(&self) -> &str;

    /// Check if rule applies to this node
    fn applicable_to(&self, node: &EnrichedSqlNode) -> bool;

    /// Evaluate the rule and return an alert if triggered
    fn evaluate(&self, context: &RuleContext) -> Option<Alert>;
}

// ============================================================================
// Rule Registry
// ============================================================================

/// Thresholds for the Iceberg replace heuristics, in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcebergThresholds {
    pub replaced_most_of_table_percentage: f64,
    pub replaced_more_files_than_records_percentage: f64,
}

impl Default for IcebergThresholds {
    fn default() -> Self {
        Self {
            replaced_most_of_table_percentage: 60.0,
            replaced_more_files_than_records_percentage: 30.0,
        }
    }
}

/// Get all registered rules
pub fn get_all_rules(thresholds: IcebergThresholds) -> Vec<Box<dyn AlertRule>> {
    let mut rules: Vec<Box<dyn AlertRule>> = Vec::new();

    rules.extend(iceberg::get_rules(thresholds));

    rules
}
