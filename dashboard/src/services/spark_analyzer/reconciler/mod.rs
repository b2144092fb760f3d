//! Incremental reconciliation of polled snapshots into derived stores
//!
//! Both reconcilers return the previous `Arc` untouched when the derived
//! content is unchanged, so callers can detect changes with `Arc::ptr_eq`.

pub mod sql_store;
pub mod status;

pub use sql_store::calculate_sql_store;
pub use status::calculate_status;
