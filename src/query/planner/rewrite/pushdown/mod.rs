//! 下推规则
//!
//! 每条规则尝试把一个父算子折叠进逻辑扫描：
//! - `filter`: 过滤
//! - `projection`: 投影
//! - `aggregate`: 聚合
//! - `join`: 共置连接
//! - `sort`: 单路由 / 多路由排序

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod projection;
pub mod sort;

pub use aggregate::PushAggregateIntoScanRule;
pub use filter::PushFilterIntoScanRule;
pub use join::PushJoinIntoScanRule;
pub use projection::PushProjectIntoScanRule;
pub use sort::{PushSortIntoMultiRoutingScanRule, PushSortIntoSingleRoutingScanRule};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use crate::core::types::Expression;
    use crate::query::planner::plan::{DeferredOperator, LogicalScan};
    use crate::query::planner::rewrite::context::RewriteContext;
    use crate::query::statement::TableRef;
    use crate::sharding::{
        HintValues, ShardingAlgorithm, ShardingRule, ShardingRuleConfiguration, ShardingStrategy,
        TableRuleConfiguration, WhereClauseConditionEngine,
    };

    fn sharded_table(name: &str) -> TableRuleConfiguration {
        TableRuleConfiguration {
            logic_table: name.to_string(),
            actual_data_nodes: ["ds_0", "ds_1"]
                .iter()
                .flat_map(|ds| (0..2).map(move |i| format!("{}.{}_{}", ds, name, i)))
                .collect(),
            database_strategy: ShardingStrategy::Standard {
                sharding_column: "user_id".into(),
                algorithm: ShardingAlgorithm::Modulo { sharding_count: 2 },
            },
            table_strategy: ShardingStrategy::Standard {
                sharding_column: "order_id".into(),
                algorithm: ShardingAlgorithm::Modulo { sharding_count: 2 },
            },
            key_generate_column: Some("order_id".into()),
        }
    }

    /// t_order / t_order_item 绑定，t_config 广播，t_user 与 t_user_profile 在 ds_0，t_archive 在 ds_1
    pub(crate) fn rule() -> ShardingRule {
        let mut single_tables = BTreeMap::new();
        single_tables.insert("t_user".to_string(), "ds_0".to_string());
        single_tables.insert("t_user_profile".to_string(), "ds_0".to_string());
        single_tables.insert("t_archive".to_string(), "ds_1".to_string());
        ShardingRule::new(ShardingRuleConfiguration {
            data_sources: vec!["ds_0".into(), "ds_1".into()],
            tables: vec![sharded_table("t_order"), sharded_table("t_order_item")],
            binding_tables: vec![vec!["t_order".into(), "t_order_item".into()]],
            broadcast_tables: vec!["t_config".into()],
            single_tables,
        })
        .expect("测试规则应当有效")
    }

    pub(crate) fn with_context<F: FnOnce(&RewriteContext<'_>)>(f: F) {
        let rule = rule();
        let engine = WhereClauseConditionEngine;
        let hint = HintValues::default();
        let ctx = RewriteContext::new(&rule, "logic_db", &[], &engine, &hint);
        f(&ctx);
    }

    /// 已下推等值过滤的扫描
    pub(crate) fn filtered_scan(table: &str, values: &[(&str, i64)]) -> LogicalScan {
        let predicate = values
            .iter()
            .map(|&(column, value)| Expression::equals(Expression::column(column), Expression::literal(value)))
            .reduce(Expression::and)
            .unwrap_or_else(|| Expression::literal(true));
        LogicalScan::new("logic_db", TableRef::new(table)).pushdown(DeferredOperator::Filter { condition: predicate })
    }
}
