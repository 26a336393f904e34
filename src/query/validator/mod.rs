//! 分片语句验证模块
//!
//! 一种语句类型对应一个验证器，检查分布式改写是否安全。

pub mod ddl;
pub mod dml;
pub mod helpers;
pub mod validation_engine;
pub mod validator_enum;
pub mod validator_trait;

pub use ddl::{CreateRoutineValidator, CreateTableValidator, CreateViewValidator};
pub use dml::{DeleteValidator, InsertValidator, SelectValidator, UpdateValidator};
pub use validation_engine::ValidationEngine;
pub use validator_enum::ShardingStatementValidatorEnum;
pub use validator_trait::ShardingStatementValidator;
