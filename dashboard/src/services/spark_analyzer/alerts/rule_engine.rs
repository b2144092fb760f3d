//! Rule Engine for dashboard alerts
//!
//! Runs every registered rule over every node of every query, then
//! deduplicates, filters and orders the resulting alerts.

use super::rules::{get_all_rules, AlertRule, IcebergThresholds, RuleContext};
use crate::services::spark_analyzer::models::*;
use std::collections::HashSet;
use tracing::debug;

/// Alert engine configuration
#[derive(Debug, Clone)]
pub struct AlertEngineConfig {
    /// Maximum number of alerts to return
    pub max_alerts: usize,
    /// Minimum severity to report
    pub min_severity: AlertType,
    pub iceberg: IcebergThresholds,
}

impl Default for AlertEngineConfig {
    fn default() -> Self {
        Self {
            max_alerts: 100,
            min_severity: AlertType::Warning,
            iceberg: IcebergThresholds::default(),
        }
    }
}

/// Rule engine for dashboard alerts
pub struct AlertEngine {
    config: AlertEngineConfig,
    rules: Vec<Box<dyn AlertRule>>,
}

impl AlertEngine {
    /// Create a new engine with default configuration
    pub fn new() -> Self {
        Self::with_config(AlertEngineConfig::default())
    }

    pub fn with_config(config: AlertEngineConfig) -> Self {
        let rules = get_all_rules(config.iceberg);
        Self { config, rules }
    }

    pub fn config(&self) -> &AlertEngineConfig {
        &self.config
    }

    /// Evaluate all rules against the store
    pub fn analyze(&self, store: &SparkSqlStore) -> Alerts {
        let mut alerts = Vec::new();

        for sql in &store.sqls {
            for node in &sql.nodes {
                let context = RuleContext { sql: sql.as_ref(), node };
                for rule in &self.rules {
                    if !rule.applicable_to(node) {
                        continue;
                    }
                    if let Some(alert) = rule.evaluate(&context) {
                        if alert.alert_type >= self.config.min_severity {
                            debug!("Rule {} raised {}", rule.id(), alert.id);
                            alerts.push(alert);
                        }
                    }
                }
            }
        }

        // Stable sort keeps query order within a severity
        alerts.sort_by(|a, b| b.alert_type.cmp(&a.alert_type));

        let mut alerts = Self::deduplicate(alerts);

        if alerts.len() > self.config.max_alerts {
            alerts.truncate(self.config.max_alerts);
        }

        alerts
    }

    /// Deduplicate alerts by id
    fn deduplicate(alerts: Alerts) -> Alerts {
        let mut seen = HashSet::new();
        alerts
            .into_iter()
            .filter(|alert| seen.insert(alert.id.clone()))
            .collect()
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}
