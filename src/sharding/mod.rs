//! 分片规则模型
//!
//! 分片表、绑定表、广播表与单表的配置和只读视图，以及基于它们的路由。

pub mod algorithm;
pub mod condition;
pub mod config;
pub mod metadata;
pub mod route;
pub mod rule;

pub use algorithm::{ShardingAlgorithm, ShardingStrategy};
pub use condition::{
    ShardingCondition, ShardingConditionEngine, ShardingConditionValue, ShardingConditions,
    WhereClauseConditionEngine,
};
pub use config::{ShardingRuleConfiguration, TableRuleConfiguration};
pub use metadata::{InMemorySchemaMetadata, SchemaMetadata};
pub use route::{HintValues, RouteContext, RouteMapper, RouteUnit, ShardingRouter};
pub use rule::{BindingTableRule, DataNode, ShardingRule, TableRule};

use thiserror::Error;

/// 分片规则配置与路由错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShardingRuleError {
    #[error("无效的数据节点: {0}")]
    InvalidDataNode(String),

    #[error("分片表没有数据节点: {0}")]
    EmptyDataNodes(String),

    #[error("分片表重复配置: {0}")]
    DuplicateTable(String),

    #[error("表同时出现在多个类别中: {0}")]
    TableInMultipleCategories(String),

    #[error("绑定表不是分片表: {0}")]
    UnknownBindingTable(String),

    #[error("绑定表的数据节点数量不一致: {0}")]
    InconsistentBindingTables(String),

    #[error("未知的数据源: {0}")]
    UnknownDataSource(String),

    #[error("表 {table} 的分片值无法映射到任何目标: {values}")]
    UnroutableShardingValue { table: String, values: String },
}
