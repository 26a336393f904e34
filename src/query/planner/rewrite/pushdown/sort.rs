//! 排序下推
//!
//! 两条互斥规则，按扫描是否单路由选择：
//!
//! - 单路由：排序连同 OFFSET/FETCH 整体下推到唯一的目标分片。
//! - 多路由：排序从不整体下推。没有 FETCH 时每个分片执行无界排序，
//!   联邦层用同一排序规则做多路归并；有 FETCH 时每个分片只保留前
//!   `offset + fetch` 行，归并后再按原始 OFFSET/FETCH 截取。
//!
//! 全局前 `offset + fetch` 行中的任意一行，在它所在分片内必然也排在前
//! `offset + fetch` 行之内，所以分片本地截断不会丢掉候选行。

use crate::query::planner::plan::{
    DeferredOperator, LogicalPlan, LogicalScan, MergeSortNode, PlanKind, RowBound, SortNode,
};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::{Pattern, RoutingPredicate};
use crate::query::planner::rewrite::result::TransformResult;
use crate::query::planner::rewrite::rule::{push_into_child_scan, PushDownRule, RewriteRule};

fn sort_of(node: &LogicalPlan) -> Option<&SortNode> {
    match node {
        LogicalPlan::Sort(sort) => Some(sort),
        _ => None,
    }
}

/// 单路由扫描上的排序
#[derive(Debug, Default)]
pub struct PushSortIntoSingleRoutingScanRule;

impl PushSortIntoSingleRoutingScanRule {
    pub fn new() -> Self {
        Self
    }
}

impl RewriteRule for PushSortIntoSingleRoutingScanRule {
    fn name(&self) -> &'static str {
        "PushSortIntoSingleRoutingScanRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_kind(PlanKind::Sort)
            .with_dependency(Pattern::new_with_kind(PlanKind::Scan).with_routing(RoutingPredicate::SingleRouting))
    }

    fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
        push_into_child_scan(self, ctx, node)
    }
}

impl PushDownRule for PushSortIntoSingleRoutingScanRule {
    fn can_push_down(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> bool {
        sort_of(node).is_some() && ctx.is_single_routing(target)
    }

    fn push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> Option<TransformResult> {
        let sort = sort_of(node)?;
        let scan = target.pushdown(DeferredOperator::Sort {
            collation: sort.collation.clone(),
            offset: sort.offset.clone(),
            fetch: sort.fetch.clone(),
        });
        Some(TransformResult::new(LogicalPlan::Scan(scan)))
    }
}

/// 多路由扫描上的排序
#[derive(Debug, Default)]
pub struct PushSortIntoMultiRoutingScanRule;

impl PushSortIntoMultiRoutingScanRule {
    pub fn new() -> Self {
        Self
    }
}

impl RewriteRule for PushSortIntoMultiRoutingScanRule {
    fn name(&self) -> &'static str {
        "PushSortIntoMultiRoutingScanRule"
    }

    fn pattern(&self) -> Pattern {
        Pattern::new_with_kind(PlanKind::Sort)
            .with_dependency(Pattern::new_with_kind(PlanKind::Scan).with_routing(RoutingPredicate::MultiRouting))
    }

    fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
        push_into_child_scan(self, ctx, node)
    }
}

impl PushDownRule for PushSortIntoMultiRoutingScanRule {
    fn can_push_down(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> bool {
        sort_of(node).is_some() && !ctx.is_single_routing(target)
    }

    fn push_down(&self, _ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> Option<TransformResult> {
        let sort = sort_of(node)?;
        let pushed_fetch = sort
            .fetch
            .as_ref()
            .map(|fetch| RowBound::pushed_fetch(sort.offset.as_ref(), fetch));
        let scan = target.pushdown(DeferredOperator::Sort {
            collation: sort.collation.clone(),
            offset: None,
            fetch: pushed_fetch,
        });
        let merge = MergeSortNode {
            input: Box::new(LogicalPlan::Scan(scan)),
            collation: sort.collation.clone(),
            offset: sort.offset.clone(),
            fetch: sort.fetch.clone(),
        };
        Some(TransformResult::new(LogicalPlan::MergeSort(merge)))
    }
}
