//! Iceberg commit rules
//!
//! Copy-on-write `ReplaceData` commits rewrite whole data files. When many
//! files are rewritten for few changed records, or most of the table is
//! rewritten, the write mode or partitioning is usually wrong.

use super::*;
use crate::models::IcebergCommitMetrics;
use crate::utils::calculate_percentage;

pub const REPLACE_DATA_NODE: &str = "ReplaceData";

pub const INEFFICIENT_REPLACE: &str = "inefficientIcebergReplaceTable";
pub const REPLACED_MOST_OF_TABLE: &str = "replacedMostOfIcebergTable";

/// Replace heuristics on `ReplaceData` nodes with commit metrics
///
/// Files changed above the records threshold while records changed below it
/// is an inefficient replace; otherwise files changed above the table
/// threshold means most of the table was replaced. At most one fires.
pub struct IcebergReplacesRule {
    thresholds: IcebergThresholds,
}

impl IcebergReplacesRule {
    pub fn new(thresholds: IcebergThresholds) -> Self {
        Self { thresholds }
    }

    /// Percentage of the table's data files removed by the commit
    pub fn table_changed_percentage(metrics: &IcebergCommitMetrics) -> f64 {
        calculate_percentage(metrics.removed_data_files as f64, metrics.total_data_files as f64)
    }

    /// Net record churn as a percentage of the table's records
    pub fn records_changed_percentage(metrics: &IcebergCommitMetrics) -> f64 {
        let total = metrics.total_records as f64;
        if metrics.removed_records == metrics.total_records {
            calculate_percentage(metrics.removed_records as f64, total)
        } else {
            calculate_percentage(metrics.added_records.abs_diff(metrics.removed_records) as f64, total)
        }
    }
}

impl AlertRule for IcebergReplacesRule {
    fn id(&self) -> &str {
        "icebergReplaces"
    }

    fn applicable_to(&self, node: &EnrichedSqlNode) -> bool {
        node.node_name == REPLACE_DATA_NODE && node.iceberg_commit.is_some()
    }

    fn evaluate(&self, context: &RuleContext) -> Option<Alert> {
        let commit = context.node.iceberg_commit.as_ref()?;
        let table_changed = Self::table_changed_percentage(&commit.metrics);
        let records_changed = Self::records_changed_percentage(&commit.metrics);
        let files_threshold = self.thresholds.replaced_more_files_than_records_percentage;

        if table_changed > files_threshold && records_changed < files_threshold {
            Some(Alert {
                id: context.alert_id(INEFFICIENT_REPLACE),
                name: INEFFICIENT_REPLACE.to_string(),
                title: "Inefficient Replace Of Data In Iceberg Table".to_string(),
                location: context.location(),
                message: format!(
                    "{:.1}% of table {} files were replaced, while only {:.1}% of records were changed",
                    table_changed, commit.table_name, records_changed
                ),
                suggestion: [
                    "1. Switch to merge-on-read mode to avoid the need to write the entire table data",
                    "2. Partition the table in such a way that use of update/merge/delete operation to update only the required partitions",
                ]
                .join("\n"),
                alert_type: AlertType::Warning,
                source: context.source(),
            })
        } else if table_changed > self.thresholds.replaced_most_of_table_percentage {
            Some(Alert {
                id: context.alert_id(REPLACED_MOST_OF_TABLE),
                name: REPLACED_MOST_OF_TABLE.to_string(),
                title: "Replaced Most Of Iceberg Table".to_string(),
                location: context.location(),
                message: format!(
                    "{:.1}% of table {} files were replaced, which is a mis-use of iceberg update/merge/delete operations",
                    table_changed, commit.table_name
                ),
                suggestion: [
                    "1. Partition the table in such a way that use of update/merge/delete operation to update only the required partitions",
                    "2. Switch to merge-on-read mode to avoid the need to write the entire table data",
                ]
                .join("\n"),
                alert_type: AlertType::Warning,
                source: context.source(),
            })
        } else {
            None
        }
    }
}

pub fn get_rules(thresholds: IcebergThresholds) -> Vec<Box<dyn AlertRule>> {
    vec![Box::new(IcebergReplacesRule::new(thresholds))]
}
