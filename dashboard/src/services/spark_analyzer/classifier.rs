//! Node classifier
//!
//! Maps plan-node names to a display category, filters metrics to the ones
//! relevant for that category and guarantees each query has an output node.

use super::models::{EnrichedSparkSql, EnrichedSqlNode, NodeType};
use super::parser::parse_file_scan;
use crate::models::{SparkPlanNode, SparkSql, SqlMetric};

/// Wrapper node Spark adds around adaptive plans; never the real output
pub const ADAPTIVE_SPARK_PLAN: &str = "AdaptiveSparkPlan";

/// Exact-name classification table, unknown names fall to `Other`
const NODE_TYPES: &[(&str, NodeType)] = &[
    ("Scan csv", NodeType::Input),
    ("Scan text", NodeType::Input),
    ("Execute InsertIntoHadoopFsRelationCommand", NodeType::Output),
    ("BroadcastHashJoin", NodeType::Join),
    ("SortMergeJoin", NodeType::Join),
    ("CollectLimit", NodeType::Join),
    ("filter", NodeType::Transformation),
];

pub fn calc_node_type(name: &str) -> NodeType {
    NODE_TYPES
        .iter()
        .find(|(node_name, _)| *node_name == name)
        .map(|(_, node_type)| *node_type)
        .unwrap_or(NodeType::Other)
}

/// Metric names shown for each category
pub fn metric_allowlist(node_type: NodeType) -> &'static [&'static str] {
    match node_type {
        NodeType::Input => &["number of output rows", "number of files", "size of files"],
        NodeType::Output => &[
            "number of written files",
            "number of output rows",
            "written output",
        ],
        NodeType::Join => &["number of output rows"],
        NodeType::Transformation => &["number of output rows"],
        NodeType::Other => &[],
    }
}

pub fn calc_node_metrics(node_type: NodeType, metrics: &[SqlMetric]) -> Vec<SqlMetric> {
    let allowlist = metric_allowlist(node_type);
    metrics
        .iter()
        .filter(|metric| allowlist.contains(&metric.name.as_str()))
        .cloned()
        .collect()
}

fn enrich_node(node: &SparkPlanNode) -> EnrichedSqlNode {
    let node_type = calc_node_type(&node.node_name);
    EnrichedSqlNode {
        node_id: node.node_id,
        node_name: node.node_name.clone(),
        node_type,
        is_visible: node_type != NodeType::Other,
        metrics: calc_node_metrics(node_type, &node.metrics),
        iceberg_commit: node.iceberg_commit.clone(),
        parsed_plan: None,
    }
}

/// Attach parsed plan fields to input/output nodes that carry plan text
fn attach_parsed_plan(enriched: &mut EnrichedSqlNode, raw: &SparkPlanNode) {
    if !matches!(enriched.node_type, NodeType::Input | NodeType::Output) {
        return;
    }
    if let Some(text) = raw.plan_description.as_deref() {
        let parsed = parse_file_scan(text, &raw.node_name);
        if !parsed.is_empty() {
            enriched.parsed_plan = Some(parsed);
        }
    }
}

/// Classify every node of a query
///
/// When nothing was classified as output, the last node that is not
/// `AdaptiveSparkPlan` becomes the visible output node.
pub fn calculate_sql(sql: &SparkSql) -> EnrichedSparkSql {
    let mut nodes: Vec<EnrichedSqlNode> = sql.nodes.iter().map(enrich_node).collect();

    if !nodes.iter().any(|node| node.node_type == NodeType::Output) {
        if let Some(last) = nodes
            .iter_mut()
            .rev()
            .find(|node| node.node_name != ADAPTIVE_SPARK_PLAN)
        {
            last.node_type = NodeType::Output;
            last.is_visible = true;
        }
    }

    for (enriched, raw) in nodes.iter_mut().zip(&sql.nodes) {
        attach_parsed_plan(enriched, raw);
    }

    EnrichedSparkSql::from_raw(sql, nodes)
}

pub fn calculate_sqls(sqls: &[SparkSql]) -> Vec<EnrichedSparkSql> {
    sqls.iter().map(calculate_sql).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SqlStatus;

    fn metric(name: &str, value: &str) -> SqlMetric {
        SqlMetric { name: name.to_string(), value: value.to_string() }
    }

    fn node(id: i64, name: &str) -> SparkPlanNode {
        SparkPlanNode {
            node_id: id,
            node_name: name.to_string(),
            metrics: vec![],
            iceberg_commit: None,
            plan_description: None,
        }
    }

    fn sql(nodes: Vec<SparkPlanNode>) -> SparkSql {
        SparkSql {
            id: "0".to_string(),
            status: SqlStatus::Completed,
            description: "test".to_string(),
            duration: 100,
            failure_reason: None,
            nodes,
            edges: vec![],
            is_sql_command: false,
            stage_metrics: None,
        }
    }

    #[test]
    fn test_calc_node_type() {
        assert_eq!(calc_node_type("Scan csv"), NodeType::Input);
        assert_eq!(calc_node_type("Scan text"), NodeType::Input);
        assert_eq!(calc_node_type("Execute InsertIntoHadoopFsRelationCommand"), NodeType::Output);
        assert_eq!(calc_node_type("SortMergeJoin"), NodeType::Join);
        assert_eq!(calc_node_type("filter"), NodeType::Transformation);
        assert_eq!(calc_node_type("Filter"), NodeType::Other);
        assert_eq!(calc_node_type("Scan parquet"), NodeType::Other);
    }

    #[test]
    fn test_metrics_filtered_in_order() {
        let metrics = vec![
            metric("size of files", "10 MB"),
            metric("scan time", "1 s"),
            metric("number of output rows", "42"),
        ];
        let filtered = calc_node_metrics(NodeType::Input, &metrics);
        let names: Vec<&str> = filtered.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["size of files", "number of output rows"]);

        assert!(calc_node_metrics(NodeType::Other, &metrics).is_empty());
    }

    #[test]
    fn test_visibility_follows_type() {
        let enriched = calculate_sql(&sql(vec![
            node(0, "Scan csv"),
            node(1, "Project"),
            node(2, "Execute InsertIntoHadoopFsRelationCommand"),
        ]));
        let visible: Vec<bool> = enriched.nodes.iter().map(|n| n.is_visible).collect();
        assert_eq!(visible, vec![true, false, true]);
    }

    #[test]
    fn test_last_node_becomes_output() {
        let enriched = calculate_sql(&sql(vec![
            node(0, "Scan csv"),
            node(1, "HashAggregate"),
            node(2, "AdaptiveSparkPlan"),
        ]));
        let outputs: Vec<i64> = enriched
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Output)
            .map(|n| n.node_id)
            .collect();
        assert_eq!(outputs, vec![1]);
        assert!(enriched.nodes[1].is_visible);
        assert_eq!(enriched.nodes[2].node_type, NodeType::Other);
    }

    #[test]
    fn test_existing_output_not_reclassified() {
        let enriched = calculate_sql(&sql(vec![
            node(0, "Execute InsertIntoHadoopFsRelationCommand"),
            node(1, "Scan csv"),
        ]));
        assert_eq!(enriched.output_node().map(|n| n.node_id), Some(0));
        assert_eq!(enriched.nodes[1].node_type, NodeType::Input);
    }

    #[test]
    fn test_no_candidate_for_output() {
        assert!(calculate_sql(&sql(vec![])).nodes.is_empty());

        let enriched = calculate_sql(&sql(vec![node(0, "AdaptiveSparkPlan")]));
        assert_eq!(enriched.nodes[0].node_type, NodeType::Other);
        assert!(!enriched.nodes[0].is_visible);
    }

    #[test]
    fn test_reclassified_output_keeps_other_metrics_filter() {
        let mut project = node(1, "Project");
        project.metrics = vec![metric("number of output rows", "5")];
        let enriched = calculate_sql(&sql(vec![node(0, "Scan csv"), project]));
        // Metrics were filtered with the original category
        assert!(enriched.nodes[1].metrics.is_empty());
        assert_eq!(enriched.nodes[1].node_type, NodeType::Output);
    }

    #[test]
    fn test_parsed_plan_attached_to_scan() {
        let mut scan = node(0, "Scan csv");
        scan.plan_description =
            Some("Format: CSV, Location: InMemoryFileIndex(1 paths)[file:/tmp/in.csv]".to_string());
        let mut other = node(1, "Project");
        other.plan_description = Some("Format: CSV,".to_string());

        let enriched = calculate_sql(&sql(vec![scan, other, node(2, "AdaptiveSparkPlan")]));
        let parsed = enriched.nodes[0].parsed_plan.as_ref().unwrap();
        assert_eq!(parsed.format.as_deref(), Some("CSV"));
        assert_eq!(parsed.location.as_deref(), Some("file:/tmp/in.csv"));
        // Project is reclassified as output after metrics, so its text is parsed too
        assert_eq!(
            enriched.nodes[1].parsed_plan.as_ref().and_then(|p| p.format.as_deref()),
            Some("CSV")
        );
    }
}
