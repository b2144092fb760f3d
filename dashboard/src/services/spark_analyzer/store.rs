//! Application store and the poll-action reducer
//!
//! Each poll result arrives as an [`ApiAction`]. The reducer folds it into a
//! new [`AppStore`], handing back the same `Arc` when nothing visible changed.

use super::alerts::AlertEngine;
use super::models::{Alerts, SparkSqlStore, StatusStore};
use super::reconciler::{calculate_sql_store, calculate_status};
use crate::models::{SparkConfiguration, SparkSql, SparkStage};
use crate::utils::AnalyzerResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration keys surfaced on the configuration tab, in display order
const SPARK_PROPERTY_KEYS: &[&str] = &["spark.app.name", "spark.app.id"];
const SYSTEM_PROPERTY_KEYS: &[&str] = &["sun.java.command"];
const SPARK_MASTER_KEY: &str = "spark.master";

/// A poll result to fold into the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiAction {
    #[serde(rename = "setInitial", rename_all = "camelCase")]
    SetInitial {
        config: SparkConfiguration,
        app_id: String,
        spark_version: String,
    },
    #[serde(rename = "setSQL")]
    SetSql { value: Vec<SparkSql> },
    #[serde(rename = "setStatus")]
    SetStatus { value: Vec<SparkStage> },
}

/// Everything the dashboard renders from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppStore {
    pub is_initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spark_version: Option<String>,
    /// Selected configuration entries, missing keys omitted
    pub config: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<Arc<SparkSqlStore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Arc<StatusStore>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Arc<Alerts>>,
}

impl AppStore {
    /// True when there is no running query worth showing
    pub fn should_show_no_query(&self) -> bool {
        let no_sql = self.sql.as_ref().map(|s| s.is_empty()).unwrap_or(true);
        let idle = self.status.as_ref().map(|s| s.is_idle()).unwrap_or(false);
        no_sql || idle
    }

    /// Description of the most recent query
    pub fn current_query_description(&self) -> Option<&str> {
        self.sql.as_ref()?.last().map(|sql| sql.description.as_str())
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Pull the application name and the displayed configuration entries
pub fn extract_config(configuration: &SparkConfiguration) -> (Option<String>, Vec<(String, String)>) {
    let spark = &configuration.spark_properties;
    let system = &configuration.system_properties;
    let runtime = &configuration.runtime;

    let app_name = lookup(spark, "spark.app.name").map(str::to_string);

    let mut config = Vec::new();
    let mut push = |key: &str, value: Option<&str>| {
        if let Some(value) = value {
            config.push((key.to_string(), value.to_string()));
        }
    };
    for &key in SPARK_PROPERTY_KEYS {
        push(key, lookup(spark, key));
    }
    for &key in SYSTEM_PROPERTY_KEYS {
        push(key, lookup(system, key));
    }
    push(SPARK_MASTER_KEY, lookup(spark, SPARK_MASTER_KEY));
    push("javaVersion", runtime.java_version.as_deref());
    push("scalaVersion", runtime.scala_version.as_deref());

    (app_name, config)
}

/// Recompute alerts, keeping the existing list when identical
pub fn calculate_alerts(
    existing: Option<&Arc<Alerts>>,
    store: &SparkSqlStore,
    engine: &AlertEngine,
) -> Arc<Alerts> {
    let alerts = engine.analyze(store);
    match existing {
        Some(existing) if **existing == alerts => Arc::clone(existing),
        _ => Arc::new(alerts),
    }
}

/// Fold one poll result into the store
pub fn spark_api_reducer(
    state: &Arc<AppStore>,
    action: ApiAction,
    engine: &AlertEngine,
) -> AnalyzerResult<Arc<AppStore>> {
    match action {
        ApiAction::SetInitial { config, app_id, spark_version } => {
            let (app_name, config) = extract_config(&config);
            info!("Initialized application {} ({:?})", app_id, app_name);
            Ok(Arc::new(AppStore {
                is_initialized: true,
                app_name,
                app_id: Some(app_id),
                spark_version: Some(spark_version),
                config,
                sql: None,
                status: None,
                alerts: None,
            }))
        }
        ApiAction::SetSql { value } => {
            let sql_store = calculate_sql_store(state.sql.as_ref(), &value)?;
            if state.sql.as_ref().is_some_and(|current| Arc::ptr_eq(current, &sql_store)) {
                return Ok(Arc::clone(state));
            }

            let alerts = calculate_alerts(state.alerts.as_ref(), &sql_store, engine);
            debug!(
                "SQL store updated: {} queries, {} alerts",
                sql_store.len(),
                alerts.len()
            );
            Ok(Arc::new(AppStore {
                sql: Some(sql_store),
                alerts: Some(alerts),
                ..(**state).clone()
            }))
        }
        ApiAction::SetStatus { value } => {
            let status = calculate_status(state.status.as_ref(), &value);
            if state.status.as_ref().is_some_and(|current| Arc::ptr_eq(current, &status)) {
                return Ok(Arc::clone(state));
            }

            debug!("Status updated: {:?}", status.status);
            Ok(Arc::new(AppStore {
                status: Some(status),
                ..(**state).clone()
            }))
        }
    }
}
