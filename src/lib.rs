//! ShardFed - sharding statement validation and push-down federation planning
//!
//! This crate checks statements against a sharding rule before they are sent to
//! the physical shards, and plans queries so that as much work as possible runs
//! inside each shard while the remainder is merged at the federation layer.

pub mod config;
pub mod core;
pub mod query;
pub mod sharding;
pub mod utils;
