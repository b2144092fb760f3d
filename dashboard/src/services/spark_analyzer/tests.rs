//! End-to-end tests driven by recorded plan text and poll snapshots
//!
//! Fixtures live under `tests/fixtures/`: `plans/` holds raw plan descriptions,
//! `snapshots/` holds one poll action per file, replayed in file-name order.

use crate::services::spark_analyzer::*;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Get the path to a fixture
fn get_fixture_path(subdir: &str, filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(subdir);
    path.push(filename);
    path
}

fn load_plan(filename: &str) -> String {
    let path = get_fixture_path("plans", filename);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", path.display(), e))
}

fn load_action(filename: &str) -> ApiAction {
    let path = get_fixture_path("snapshots", filename);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Invalid snapshot {}: {}", path.display(), e))
}

/// Replay snapshots in order, returning every intermediate state
fn replay(files: &[&str]) -> Vec<Arc<AppStore>> {
    let engine = AlertEngine::new();
    let mut states = vec![Arc::new(AppStore::default())];
    for file in files {
        let current = states.last().cloned().unwrap();
        let next = spark_api_reducer(&current, load_action(file), &engine)
            .unwrap_or_else(|e| panic!("Reducer failed on {}: {}", file, e));
        states.push(next);
    }
    states
}

// ========================================================================
// Plan-Text Parser Tests
// ========================================================================

mod plan_parser_tests {
    use super::*;

    #[test]
    fn test_full_parquet_scan() {
        let plan = parse_file_scan(&load_plan("scan_parquet.txt"), "Scan parquet spark_catalog.db.events");

        assert_eq!(plan.format.as_deref(), Some("Parquet"));
        assert_eq!(plan.location.as_deref(), Some("s3://warehouse/db/events"));
        assert_eq!(
            plan.partition_filters,
            Some(vec!["isnotnull(day)".to_string(), "(day = 2024-01-01)".to_string()])
        );
        assert_eq!(
            plan.pushed_filters,
            Some(vec!["IsNotNull(id)".to_string(), "IsNotNull(amount)".to_string()])
        );
        assert_eq!(plan.schema_type("id"), Some("bigint"));
        assert_eq!(plan.schema_type("amount"), Some("decimal(10,2)"));
        assert_eq!(plan.table_name.as_deref(), Some("spark_catalog.db.events"));
    }

    #[test]
    fn test_truncated_scan() {
        let plan = parse_file_scan(&load_plan("scan_truncated.txt"), "Scan parquet db.logs");

        assert_eq!(plan.format.as_deref(), Some("Parquet"));
        // Only the first path survives a truncated location list
        assert_eq!(plan.location.as_deref(), Some("s3://logs/day=1"));
        assert_eq!(plan.partition_filters, Some(vec![]));
        assert_eq!(plan.pushed_filters, None);
        assert_eq!(plan.read_schema, None);
        assert_eq!(plan.table_name.as_deref(), Some("db.logs"));
    }

    #[test]
    fn test_custom_rule_table() {
        let format_rule = parser::DEFAULT_FIELD_RULES
            .iter()
            .find(|rule| rule.field == parser::PlanField::Format)
            .copied()
            .unwrap();
        let format_only = parser::FileScanParser::with_rules(&[format_rule]).unwrap();

        let plan = format_only.parse(&load_plan("scan_parquet.txt"), "Scan parquet");
        assert_eq!(plan.format.as_deref(), Some("Parquet"));
        assert_eq!(plan.location, None);
        assert_eq!(plan.table_name, None);
    }
}

// ========================================================================
// Replay Tests
// ========================================================================

mod replay_tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        let states = replay(&["01_initial.json"]);
        let state = &states[1];

        assert!(state.is_initialized);
        assert_eq!(state.app_name.as_deref(), Some("iceberg-nightly"));
        assert_eq!(state.spark_version.as_deref(), Some("3.5.1"));
        let keys: Vec<&str> = state.config.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "spark.app.name",
                "spark.app.id",
                "sun.java.command",
                "spark.master",
                "javaVersion",
                "scalaVersion"
            ]
        );
        assert!(state.should_show_no_query());
    }

    #[test]
    fn test_first_sql_poll_classifies_and_alerts() {
        let states = replay(&["01_initial.json", "02_sql.json"]);
        let store = states[2].sql.as_ref().unwrap();
        assert_eq!(store.len(), 2);

        let load = &store.sqls[0];
        let scan = &load.nodes[0];
        assert_eq!(scan.node_type, NodeType::Input);
        let metric_names: Vec<&str> = scan.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(metric_names, vec!["number of output rows", "number of files"]);

        let parsed = scan.parsed_plan.as_ref().unwrap();
        assert_eq!(parsed.format.as_deref(), Some("CSV"));
        assert_eq!(parsed.location.as_deref(), Some("file:/data/raw/events.csv"));
        assert_eq!(parsed.schema_type("payload"), Some("string"));
        assert_eq!(parsed.table_name, None);

        assert!(!load.nodes[1].is_visible);
        assert_eq!(load.output_node().map(|n| n.node_id), Some(2));

        // ReplaceData is promoted to output, AdaptiveSparkPlan is skipped
        let merge = &store.sqls[1];
        assert_eq!(merge.output_node().map(|n| n.node_name.as_str()), Some("ReplaceData"));
        assert_eq!(merge.nodes[2].node_type, NodeType::Other);

        let alerts = states[2].alerts.as_ref().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].id, "replacedMostOfIcebergTable_1_1");
        assert_eq!(alerts[0].alert_type, AlertType::Warning);
        assert_eq!(
            alerts[0].source,
            AlertSource::Sql { sql_id: "1".to_string(), sql_node_id: 1 }
        );
    }

    #[test]
    fn test_same_length_poll_replaces_only_last() {
        let states = replay(&["02_sql.json", "03_sql.json"]);
        let before = states[1].sql.as_ref().unwrap();
        let after = states[2].sql.as_ref().unwrap();

        assert!(!Arc::ptr_eq(before, after));
        assert!(Arc::ptr_eq(&before.sqls[0], &after.sqls[0]));
        assert!(!Arc::ptr_eq(&before.sqls[1], &after.sqls[1]));
        assert_eq!(after.sqls[1].status, crate::models::SqlStatus::Completed);

        // Alert content did not change, so the list keeps its identity
        let alerts_before = states[1].alerts.as_ref().unwrap();
        let alerts_after = states[2].alerts.as_ref().unwrap();
        assert!(Arc::ptr_eq(alerts_before, alerts_after));
    }

    #[test]
    fn test_repeated_poll_is_idempotent() {
        let states = replay(&["02_sql.json", "02_sql.json"]);
        assert!(Arc::ptr_eq(&states[1], &states[2]));
    }

    #[test]
    fn test_growth_preserves_history_by_reference() {
        let states = replay(&["02_sql.json", "03_sql.json", "04_sql.json"]);
        let before = states[2].sql.as_ref().unwrap();
        let after = states[3].sql.as_ref().unwrap();

        assert_eq!(after.len(), 3);
        assert!(Arc::ptr_eq(&before.sqls[0], &after.sqls[0]));
        // The previous tail is re-enriched but carries the same content
        assert_eq!(*before.sqls[1], *after.sqls[1]);

        let failed = &after.sqls[2];
        assert_eq!(failed.output_node().map(|n| n.node_name.as_str()), Some("SortMergeJoin"));
        assert_eq!(states[3].current_query_description(), Some("compact db.events"));
    }

    #[test]
    fn test_shrinking_poll_is_rejected() {
        let engine = AlertEngine::new();
        let states = replay(&["04_sql.json"]);
        let result = spark_api_reducer(&states[1], load_action("02_sql.json"), &engine);
        assert!(matches!(
            result,
            Err(crate::utils::AnalyzerError::QueryListShrank { previous: 3, current: 2 })
        ));
    }

    #[test]
    fn test_status_snapshot() {
        let states = replay(&["01_initial.json", "04_sql.json", "05_status.json"]);
        let status = states[3].status.as_ref().unwrap();

        assert_eq!(status.total_active_tasks, 0);
        assert_eq!(status.total_pending_tasks, 1);
        assert_eq!(status.total_input_display(), "1.5 MB");
        assert_eq!(status.total_output_display(), "2.0 KB");
        assert!(status.is_idle());
        assert!(states[3].should_show_no_query());

        // SQL state untouched by a status poll
        assert!(Arc::ptr_eq(
            states[2].sql.as_ref().unwrap(),
            states[3].sql.as_ref().unwrap()
        ));
    }
}

// ========================================================================
// Table Tests
// ========================================================================

mod table_tests {
    use super::*;

    #[test]
    fn test_table_rows_from_replay() {
        let states = replay(&["04_sql.json"]);
        let mut rows = create_sql_table_data(states[1].sql.as_ref().unwrap());
        sort_rows(&mut rows, SortColumn::Duration, Order::Asc);

        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "0"]);
        assert_eq!(rows[0].failure_reason, "org.apache.spark.SparkException: Job aborted");
        assert_eq!(rows[2].duration_display, "4.2s");
        assert_eq!(rows[2].input_bytes, Some(5_242_880));
        assert_eq!(rows[0].input_bytes, None);
    }

    #[test]
    fn test_analyze_sqls_matches_reducer() {
        let ApiAction::SetSql { value } = load_action("04_sql.json") else {
            panic!("04_sql.json is not a setSQL action");
        };
        let analysis = analyze_sqls(&value, &AlertEngine::new());
        let states = replay(&["04_sql.json"]);

        assert_eq!(*analysis.store, **states[1].sql.as_ref().unwrap());
        assert_eq!(analysis.alerts, **states[1].alerts.as_ref().unwrap());
    }
}
