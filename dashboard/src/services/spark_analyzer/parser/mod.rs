//! Plan-text parser module
//!
//! Scrapes structured fields out of Spark physical-plan descriptions.

pub mod file_scan_parser;
pub mod plan_utils;

pub use file_scan_parser::{
    parse_file_scan, Extraction, FieldRule, FileScanParser, PlanField, DEFAULT_FIELD_RULES,
    RULE_SET_VERSION,
};
pub use plan_utils::{hash_numbers_remover, split_top_level, TRUNCATION_MARKER};

use super::models::ParsedFileScanPlan;

/// Narrow parsing seam: plan text plus node label in, partial record out
///
/// Implementations never fail; fields they cannot read are left as `None`.
pub trait PlanParser: Send + Sync {
    fn parse(&self, text: &str, node_name: &str) -> ParsedFileScanPlan;
}
