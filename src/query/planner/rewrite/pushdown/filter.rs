//! 过滤下推
//!
//! ```text
//!   Filter(cond)                Scan(t -> Filter(cond))
//!     Scan(t)           =>
//! ```

use crate::query::planner::plan::{DeferredOperator, LogicalPlan, LogicalScan, PlanKind};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::TransformResult;
use crate::query::planner::rewrite::rule::{push_into_child_scan, PushDownRule, RewriteRule};

/// 过滤条件总是可以折叠进扫描
#[derive(Debug, Default)]
pub struct PushFilterIntoScanRule;

impl PushFilterIntoScanRule {
    pub fn new() -> Self {
        Self
    }
}

impl RewriteRule for PushFilterIntoScanRule {
    fn name(&self) -> &'static str {
        "PushFilterIntoScanRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_kind(PlanKind::Filter).with_dependency_kind(PlanKind::Scan)
    }

    fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
        push_into_child_scan(self, ctx, node)
    }
}

impl PushDownRule for PushFilterIntoScanRule {
    fn can_push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, _target: &LogicalScan) -> bool {
        matches!(node, LogicalPlan::Filter(_))
    }

    fn push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> Option<TransformResult> {
        let LogicalPlan::Filter(filter) = node else {
            return None;
        };
        let scan = target.pushdown(DeferredOperator::Filter {
            condition: filter.condition.clone(),
        });
        Some(TransformResult::new(LogicalPlan::Scan(scan)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Expression;
    use crate::query::planner::rewrite::pushdown::test_support::with_context;
    use crate::query::statement::TableRef;

    #[test]
    fn test_filter_folds_into_scan() {
        with_context(|ctx| {
            let rule = PushFilterIntoScanRule::new();
            let condition = Expression::equals(Expression::column("order_id"), Expression::literal(1));
            let plan = LogicalPlan::scan("logic_db", TableRef::new("t_order")).filter(condition.clone());
            assert!(rule.matches(ctx, &plan));

            let result = rule.apply(ctx, &plan).expect("过滤应当下推");
            let scan = result.new_node.as_scan().expect("结果应为扫描");
            assert_eq!(scan.operators(), &[DeferredOperator::Filter { condition }]);
        });
    }

    #[test]
    fn test_filter_over_non_scan_is_not_matched() {
        with_context(|ctx| {
            let rule = PushFilterIntoScanRule::new();
            let plan = LogicalPlan::scan("logic_db", TableRef::new("t_order"))
                .project(vec![Expression::column("order_id")])
                .filter(Expression::literal(true));
            assert!(!rule.matches(ctx, &plan));
            assert!(rule.apply(ctx, &plan).is_none());
        });
    }
}
