//! Alert module
//!
//! Rule-based alerts derived from the enriched SQL store.

pub mod rule_engine;
pub mod rules;

pub use rule_engine::{AlertEngine, AlertEngineConfig};
pub use rules::{AlertRule, IcebergThresholds, RuleContext};
