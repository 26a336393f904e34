//! 连接下推
//!
//! 两侧都是扫描且能证明共置时，连接连同两侧扫描合并为一个扫描，
//! 连接在每个分片本地完成：
//!
//! ```text
//!   Join(cond)
//!     Scan(t_order)          =>   Scan(t_order, t_order_item -> Join(cond))
//!     Scan(t_order_item)
//! ```
//!
//! 共置判断忽略广播表，其余表必须全部属于同一绑定组，
//! 或全部是固定在同一数据源上的单表。外连接的保留侧只有广播表、另一侧又是多路由时不合并，
//! 否则保留侧的行会在每个分片各输出一次。

use log::debug;

use crate::query::planner::plan::{JoinType, LogicalPlan, LogicalScan, PlanKind};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::TransformResult;
use crate::query::planner::rewrite::rule::{PushDownRule, RewriteRule};
use crate::sharding::ShardingRule;

#[derive(Debug, Default)]
pub struct PushJoinIntoScanRule;

impl PushJoinIntoScanRule {
    pub fn new() -> Self {
        Self
    }

    fn same_schema(left: &LogicalScan, right: &LogicalScan) -> bool {
        let schema = left.schema();
        left.schema().eq_ignore_ascii_case(right.schema())
            && left
                .tables()
                .iter()
                .chain(right.tables())
                .all(|table| table.in_schema(schema, schema))
    }

    /// 两侧出现同一张分片表
    fn has_repeated_sharding_table(rule: &ShardingRule, left: &LogicalScan, right: &LogicalScan) -> bool {
        let right_tables = right.table_names();
        left.table_names().iter().any(|table| {
            rule.is_sharding_table(table) && right_tables.iter().any(|other| other.eq_ignore_ascii_case(table))
        })
    }

    /// 多路由的一侧已带有分片局部结果，不能再参与本地连接
    fn carries_partial_result(ctx: &RewriteContext<'_>, scan: &LogicalScan) -> bool {
        (scan.has_aggregate() || scan.has_bounded_sort()) && !ctx.is_single_routing(scan)
    }

    fn duplicates_preserved_rows(
        ctx: &RewriteContext<'_>,
        join_type: JoinType,
        left: &LogicalScan,
        right: &LogicalScan,
    ) -> bool {
        let rule = ctx.sharding_rule();
        let broadcast_only = |scan: &LogicalScan| scan.table_names().iter().all(|t| rule.is_broadcast_table(t));
        let (left_preserved, right_preserved) = match join_type {
            JoinType::Inner => (false, false),
            JoinType::Left => (true, false),
            JoinType::Right => (false, true),
            JoinType::Full => (true, true),
        };
        (left_preserved && broadcast_only(left) && !ctx.is_single_routing(right))
            || (right_preserved && broadcast_only(right) && !ctx.is_single_routing(left))
    }

    fn is_colocated(rule: &ShardingRule, tables: &[String]) -> bool {
        let relevant: Vec<&str> = tables
            .iter()
            .map(String::as_str)
            .filter(|table| !rule.is_broadcast_table(table))
            .collect();
        if relevant.is_empty() {
            return true;
        }
        if relevant.iter().all(|table| rule.is_sharding_table(table)) {
            return rule.is_all_binding_tables(&relevant);
        }
        if relevant.iter().all(|table| rule.is_single_table(table)) {
            let first = rule.single_table_data_source(relevant[0]);
            return first.is_some()
                && relevant
                    .iter()
                    .all(|table| rule.single_table_data_source(table) == first);
        }
        false
    }
}

impl RewriteRule for PushJoinIntoScanRule {
    fn name(&self) -> &'static str {
        "PushJoinIntoScanRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_kind(PlanKind::Join)
            .with_dependency_kind(PlanKind::Scan)
            .with_dependency_kind(PlanKind::Scan)
    }

    fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
        let LogicalPlan::Join(join) = node else {
            return None;
        };
        let target = join.left.as_scan()?;
        if !self.can_push_down(ctx, node, target) {
            return None;
        }
        self.push_down(ctx, node, target)
    }
}

impl PushDownRule for PushJoinIntoScanRule {
    fn can_push_down(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> bool {
        let LogicalPlan::Join(join) = node else {
            return false;
        };
        let Some(right) = join.right.as_scan() else {
            return false;
        };
        let rule = ctx.sharding_rule();
        if !Self::same_schema(target, right) {
            debug!("连接两侧不在同一逻辑库，保留联邦连接");
            return false;
        }
        if Self::has_repeated_sharding_table(rule, target, right) {
            debug!("连接两侧出现同一分片表，保留联邦连接");
            return false;
        }
        if Self::carries_partial_result(ctx, target) || Self::carries_partial_result(ctx, right) {
            return false;
        }
        if Self::duplicates_preserved_rows(ctx, join.join_type, target, right) {
            debug!("{} 连接的保留侧为广播表，保留联邦连接", join.join_type.as_str());
            return false;
        }
        let mut tables = target.table_names();
        tables.extend(right.table_names());
        Self::is_colocated(rule, &tables)
    }

    fn push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> Option<TransformResult> {
        let LogicalPlan::Join(join) = node else {
            return None;
        };
        let right = join.right.as_scan()?;
        let scan = target.join(join.join_type, join.condition.clone(), right);
        Some(TransformResult::new(LogicalPlan::Scan(scan)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Expression;
    use crate::query::planner::rewrite::pushdown::test_support::{filtered_scan, with_context};
    use crate::query::statement::TableRef;

    fn join(left: &str, right: &str) -> LogicalPlan {
        LogicalPlan::join(
            LogicalPlan::scan("logic_db", TableRef::new(left)),
            LogicalPlan::scan("logic_db", TableRef::new(right)),
            JoinType::Inner,
            Expression::equals(
                Expression::qualified_column(left, "order_id"),
                Expression::qualified_column(right, "order_id"),
            ),
        )
    }

    #[test]
    fn test_binding_tables_fold() {
        with_context(|ctx| {
            let rule = PushJoinIntoScanRule::new();
            let result = rule.apply(ctx, &join("t_order", "t_order_item")).expect("绑定表应当合并");
            let scan = result.new_node.as_scan().expect("结果应为扫描");
            assert_eq!(scan.table_names(), vec!["t_order", "t_order_item"]);
            assert_eq!(scan.operators()[0].name(), "Join");
        });
    }

    #[test]
    fn test_sharded_with_broadcast_folds() {
        with_context(|ctx| {
            let rule = PushJoinIntoScanRule::new();
            assert!(rule.apply(ctx, &join("t_order", "t_config")).is_some());
        });
    }

    #[test]
    fn test_outer_join_preserving_broadcast_side() {
        with_context(|ctx| {
            let rule = PushJoinIntoScanRule::new();
            let outer = |left: LogicalPlan, right: LogicalPlan, join_type: JoinType| {
                LogicalPlan::join(left, right, join_type, Expression::literal(true))
            };
            let config = || LogicalPlan::scan("logic_db", TableRef::new("t_config"));
            let orders = || LogicalPlan::scan("logic_db", TableRef::new("t_order"));

            assert!(rule.apply(ctx, &outer(config(), orders(), JoinType::Left)).is_none());
            assert!(rule.apply(ctx, &outer(orders(), config(), JoinType::Right)).is_none());
            assert!(rule.apply(ctx, &outer(orders(), config(), JoinType::Full)).is_none());
            assert!(rule.apply(ctx, &outer(orders(), config(), JoinType::Left)).is_some());

            let pinned = LogicalPlan::Scan(filtered_scan("t_order", &[("user_id", 1), ("order_id", 1)]));
            assert!(rule.apply(ctx, &outer(config(), pinned, JoinType::Left)).is_some());
        });
    }

    #[test]
    fn test_singles_on_same_source_fold() {
        with_context(|ctx| {
            let rule = PushJoinIntoScanRule::new();
            assert!(rule.apply(ctx, &join("t_user", "t_user_profile")).is_some());
            assert!(rule.apply(ctx, &join("t_user", "t_archive")).is_none());
        });
    }

    #[test]
    fn test_unrelated_tables_decline() {
        with_context(|ctx| {
            let rule = PushJoinIntoScanRule::new();
            assert!(rule.apply(ctx, &join("t_order", "t_user")).is_none());
            assert!(rule.apply(ctx, &join("t_order", "t_order")).is_none());
        });
    }

    #[test]
    fn test_different_schema_declines() {
        with_context(|ctx| {
            let rule = PushJoinIntoScanRule::new();
            let plan = LogicalPlan::join(
                LogicalPlan::scan("logic_db", TableRef::new("t_order")),
                LogicalPlan::scan("other_db", TableRef::new("t_order_item")),
                JoinType::Inner,
                Expression::literal(true),
            );
            assert!(rule.apply(ctx, &plan).is_none());
        });
    }
}
