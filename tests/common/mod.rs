//! 集成测试共享工具模块
//!
//! 标准分片环境：
//! - `t_order` / `t_order_item` 绑定，分布在 `ds_0`、`ds_1`，每库两张表
//!   （库按 `user_id` 取模，表按 `order_id` 取模）
//! - `t_config` 广播表
//! - `t_user` 单表，位于 `ds_0`

#![allow(dead_code)]

pub mod assertions;

use shardfed::query::statement::{SqlStatement, StatementContext};
use shardfed::sharding::{InMemorySchemaMetadata, ShardingRule, ShardingRuleConfiguration};

pub const SCHEMA: &str = "logic_db";

pub const SHARDING_TOML: &str = r#"
data_sources = ["ds_0", "ds_1"]
binding_tables = [["t_order", "t_order_item"]]
broadcast_tables = ["t_config"]

[single_tables]
t_user = "ds_0"

[[tables]]
logic_table = "t_order"
actual_data_nodes = ["ds_0.t_order_0", "ds_0.t_order_1", "ds_1.t_order_0", "ds_1.t_order_1"]
key_generate_column = "order_id"
database_strategy = { type = "standard", sharding_column = "user_id", algorithm = { kind = "modulo", sharding_count = 2 } }
table_strategy = { type = "standard", sharding_column = "order_id", algorithm = { kind = "modulo", sharding_count = 2 } }

[[tables]]
logic_table = "t_order_item"
actual_data_nodes = ["ds_0.t_order_item_0", "ds_0.t_order_item_1", "ds_1.t_order_item_0", "ds_1.t_order_item_1"]
key_generate_column = "order_item_id"
database_strategy = { type = "standard", sharding_column = "user_id", algorithm = { kind = "modulo", sharding_count = 2 } }
table_strategy = { type = "standard", sharding_column = "order_id", algorithm = { kind = "modulo", sharding_count = 2 } }
"#;

pub fn sharding_config() -> ShardingRuleConfiguration {
    ShardingRuleConfiguration::from_toml_str(SHARDING_TOML).expect("测试分片配置应能解析")
}

pub fn sharding_rule() -> ShardingRule {
    ShardingRule::new(sharding_config()).expect("测试分片规则应当有效")
}

/// 逻辑库中已存在的表
pub fn metadata() -> InMemorySchemaMetadata {
    InMemorySchemaMetadata::new(SCHEMA)
        .with_table("t_order")
        .with_table("t_order_item")
        .with_table("t_config")
        .with_table("t_user")
}

pub fn context(statement: SqlStatement) -> StatementContext {
    StatementContext::new(statement)
}
