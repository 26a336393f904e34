//! 投影下推

use crate::query::planner::plan::{DeferredOperator, LogicalPlan, LogicalScan, PlanKind};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::TransformResult;
use crate::query::planner::rewrite::rule::{push_into_child_scan, PushDownRule, RewriteRule};

#[derive(Debug, Default)]
pub struct PushProjectIntoScanRule;

impl PushProjectIntoScanRule {
    pub fn new() -> Self {
        Self
    }
}

impl RewriteRule for PushProjectIntoScanRule {
    fn name(&self) -> &'static str {
        "PushProjectIntoScanRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_kind(PlanKind::Project).with_dependency_kind(PlanKind::Scan)
    }

    fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
        push_into_child_scan(self, ctx, node)
    }
}

impl PushDownRule for PushProjectIntoScanRule {
    fn can_push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, _target: &LogicalScan) -> bool {
        matches!(node, LogicalPlan::Project(_))
    }

    fn push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> Option<TransformResult> {
        let LogicalPlan::Project(project) = node else {
            return None;
        };
        let scan = target.pushdown(DeferredOperator::Project {
            expressions: project.expressions.clone(),
        });
        Some(TransformResult::new(LogicalPlan::Scan(scan)))
    }
}
