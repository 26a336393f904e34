// Query module for the sharding federation layer
//
// This module provides the statement processing pipeline including:
// - Validating bound statements against the sharding rule
// - Rewriting logical plans by pushing operators into shard scans
// - Lowering rewritten plans into physical plans
// - Merging ordered per-shard results

// Sub-modules
pub mod executor;
pub mod planner;
pub mod query_pipeline_manager;
pub mod statement;
pub mod validator;

// Re-export commonly used types for convenience
pub use query_pipeline_manager::{PlannedStatement, QueryPipelineManager};
// Re-export error types from core module
pub use crate::core::{DBError, DBResult};
