//! 聚合下推
//!
//! 普通聚合折叠进扫描。断言恰好一行的 SINGLE_VALUE 必须观察合并后的全局结果，
//! 含有它的聚合永远不下推。

use log::debug;

use crate::query::planner::plan::{DeferredOperator, LogicalPlan, LogicalScan, PlanKind};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::TransformResult;
use crate::query::planner::rewrite::rule::{push_into_child_scan, PushDownRule, RewriteRule};

#[derive(Debug, Default)]
pub struct PushAggregateIntoScanRule;

impl PushAggregateIntoScanRule {
    pub fn new() -> Self {
        Self
    }
}

impl RewriteRule for PushAggregateIntoScanRule {
    fn name(&self) -> &'static str {
        "PushAggregateIntoScanRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_kind(PlanKind::Aggregate).with_dependency_kind(PlanKind::Scan)
    }

    fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
        push_into_child_scan(self, ctx, node)
    }
}

impl PushDownRule for PushAggregateIntoScanRule {
    fn can_push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, _target: &LogicalScan) -> bool {
        let LogicalPlan::Aggregate(aggregate) = node else {
            return false;
        };
        let merged = aggregate
            .aggregates
            .iter()
            .find(|call| call.function.requires_merged_input());
        if let Some(call) = merged {
            debug!("聚合 {} 需要合并后的输入，保留在联邦层", call.function.name());
            return false;
        }
        true
    }

    fn push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> Option<TransformResult> {
        let LogicalPlan::Aggregate(aggregate) = node else {
            return None;
        };
        let scan = target.pushdown(DeferredOperator::Aggregate {
            group_keys: aggregate.group_keys.clone(),
            aggregates: aggregate.aggregates.clone(),
        });
        Some(TransformResult::new(LogicalPlan::Scan(scan)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AggregateFunction;
    use crate::query::planner::plan::AggregateCall;
    use crate::query::planner::rewrite::pushdown::test_support::with_context;
    use crate::query::statement::TableRef;

    fn aggregate_plan(function: AggregateFunction) -> LogicalPlan {
        LogicalPlan::scan("logic_db", TableRef::new("t_order"))
            .aggregate(vec![0], vec![AggregateCall::new(function, vec![1], "agg")])
    }

    #[test]
    fn test_ordinary_aggregate_folds() {
        with_context(|ctx| {
            let rule = PushAggregateIntoScanRule::new();
            let result = rule.apply(ctx, &aggregate_plan(AggregateFunction::Count)).expect("应当下推");
            assert!(result.new_node.as_scan().is_some_and(|s| s.has_aggregate()));
        });
    }

    #[test]
    fn test_single_value_is_never_folded() {
        with_context(|ctx| {
            let rule = PushAggregateIntoScanRule::new();
            let plan = aggregate_plan(AggregateFunction::SingleValue);
            assert!(rule.matches(ctx, &plan));
            assert!(rule.apply(ctx, &plan).is_none());
        });
    }
}
