//! File-scan plan parser
//!
//! Extracts format, location, filters, read schema and table name from the
//! text Spark prints for `FileSourceScanExec`-like nodes, for example:
//!
//! ```text
//! FileScan parquet [id#1,amount#2] Batched: true, Format: Parquet,
//! Location: InMemoryFileIndex(1 paths)[s3://bucket/events],
//! PartitionFilters: [isnotnull(day#3)], PushedFilters: [IsNotNull(id)],
//! ReadSchema: struct<id:int,amount:decimal(10,2)>
//! ```
//!
//! The extraction rules live in [`DEFAULT_FIELD_RULES`] so the matching can be
//! extended without touching callers. Each field is matched independently; a
//! missing match leaves the field unset.

use super::plan_utils::{hash_numbers_remover, split_top_level, TRUNCATION_MARKER};
use super::PlanParser;
use crate::services::spark_analyzer::models::ParsedFileScanPlan;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Bumped whenever the default rule table changes meaning
pub const RULE_SET_VERSION: u32 = 1;

/// Target field of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanField {
    Format,
    Location,
    PartitionFilters,
    PushedFilters,
    ReadSchema,
}

/// How the first capture group of a rule becomes a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Capture used verbatim
    Verbatim,
    /// Comma-separated paths; only the first survives when truncated
    FirstPathIfTruncated,
    /// Comma-separated list; dropped entirely when truncated
    List,
    /// `name:type` entries separated by top-level commas; dropped when truncated
    Schema,
}

/// One row of the data-driven rule table
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: PlanField,
    pub pattern: &'static str,
    pub extraction: Extraction,
}

pub const DEFAULT_FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: PlanField::Format,
        pattern: r"Format: (\w+),",
        extraction: Extraction::Verbatim,
    },
    FieldRule {
        field: PlanField::Location,
        pattern: r"Location: InMemoryFileIndex\([\w\s]+\)\[(.*?)\]",
        extraction: Extraction::FirstPathIfTruncated,
    },
    FieldRule {
        field: PlanField::PartitionFilters,
        pattern: r"PartitionFilters: \[(.*?)\]",
        extraction: Extraction::List,
    },
    FieldRule {
        field: PlanField::PushedFilters,
        pattern: r"PushedFilters: \[(.*?)\]",
        extraction: Extraction::List,
    },
    FieldRule {
        field: PlanField::ReadSchema,
        pattern: r"ReadSchema: struct<([\w\W]+)>",
        extraction: Extraction::Schema,
    },
];

enum FieldValue {
    Text(String),
    List(Vec<String>),
    Schema(Vec<(String, String)>),
}

struct CompiledRule {
    rule: FieldRule,
    regex: Regex,
}

/// Rule-table driven parser for file-scan plan text
pub struct FileScanParser {
    rules: Vec<CompiledRule>,
}

static DEFAULT_PARSER: Lazy<FileScanParser> = Lazy::new(|| {
    FileScanParser::with_rules(DEFAULT_FIELD_RULES).expect("default plan rules must compile")
});

/// Parse a node's plan text with the default rule table
pub fn parse_file_scan(input: &str, node_name: &str) -> ParsedFileScanPlan {
    DEFAULT_PARSER.parse(input, node_name)
}

impl FileScanParser {
    /// Build a parser from a custom rule table
    pub fn with_rules(rules: &[FieldRule]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    rule: *rule,
                    regex: Regex::new(rule.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    fn extract(extraction: Extraction, capture: &str) -> Option<FieldValue> {
        let truncated = capture.contains(TRUNCATION_MARKER);
        match extraction {
            Extraction::Verbatim => Some(FieldValue::Text(capture.to_string())),
            Extraction::FirstPathIfTruncated => {
                if truncated {
                    capture
                        .split(',')
                        .next()
                        .map(|path| FieldValue::Text(path.to_string()))
                } else {
                    Some(FieldValue::Text(capture.to_string()))
                }
            }
            Extraction::List => {
                if truncated {
                    return None;
                }
                let items = capture
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect();
                Some(FieldValue::List(items))
            }
            Extraction::Schema => {
                if truncated {
                    return None;
                }
                Some(FieldValue::Schema(Self::parse_schema(capture)))
            }
        }
    }

    /// Split `name:type` entries on top-level commas
    ///
    /// Entries without a colon are skipped. Nested types that contain a colon
    /// themselves (`struct<a:int>`) are split at the first colon only.
    fn parse_schema(capture: &str) -> Vec<(String, String)> {
        let mut schema: Vec<(String, String)> = Vec::new();
        for entry in split_top_level(capture) {
            let Some((name, ty)) = entry.split_once(':') else {
                debug!("Skipping schema entry without type: {:?}", entry);
                continue;
            };
            let name = name.trim().to_string();
            let ty = ty.trim().to_string();
            match schema.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = ty,
                None => schema.push((name, ty)),
            }
        }
        schema
    }

    fn assign(plan: &mut ParsedFileScanPlan, field: PlanField, value: FieldValue) {
        match (field, value) {
            (PlanField::Format, FieldValue::Text(v)) => plan.format = Some(v),
            (PlanField::Location, FieldValue::Text(v)) => plan.location = Some(v),
            (PlanField::PartitionFilters, FieldValue::List(v)) => plan.partition_filters = Some(v),
            (PlanField::PushedFilters, FieldValue::List(v)) => plan.pushed_filters = Some(v),
            (PlanField::ReadSchema, FieldValue::Schema(v)) => plan.read_schema = Some(v),
            (field, _) => debug!("Rule extraction does not fit field {:?}", field),
        }
    }

    /// `"Execute <Op> <table>"` style labels carry the table as third token
    fn table_name(node_name: &str) -> Option<String> {
        let tokens: Vec<&str> = node_name.split(' ').collect();
        if tokens.len() == 3 {
            Some(tokens[2].to_string())
        } else {
            None
        }
    }
}

impl PlanParser for FileScanParser {
    fn parse(&self, text: &str, node_name: &str) -> ParsedFileScanPlan {
        let input = hash_numbers_remover(text);
        let mut plan = ParsedFileScanPlan::default();

        for compiled in &self.rules {
            let Some(capture) = compiled.regex.captures(&input).and_then(|c| c.get(1)) else {
                continue;
            };
            if let Some(value) = Self::extract(compiled.rule.extraction, capture.as_str()) {
                Self::assign(&mut plan, compiled.rule.field, value);
            }
        }

        plan.table_name = Self::table_name(node_name);
        plan
    }
}
