//! 模式匹配定义
//!
//! 规则通过模式声明它匹配的操作数形状：父节点类型、子节点类型，
//! 以及可选的路由谓词（例如“扫描是多路由的”）。

use crate::query::planner::plan::{LogicalPlan, PlanKind};
use crate::query::planner::rewrite::context::RewriteContext;

/// 节点匹配条件
#[derive(Debug, Clone, PartialEq)]
pub enum MatchNode {
    /// 匹配单一节点类型
    Single(PlanKind),
    /// 匹配多个节点类型之一
    Multi(Vec<PlanKind>),
}

impl MatchNode {
    pub fn matches(&self, kind: PlanKind) -> bool {
        match self {
            MatchNode::Single(expected) => *expected == kind,
            MatchNode::Multi(kinds) => kinds.contains(&kind),
        }
    }

    pub fn as_single(&self) -> Option<PlanKind> {
        match self {
            MatchNode::Single(kind) => Some(*kind),
            MatchNode::Multi(_) => None,
        }
    }
}

/// 扫描节点的路由谓词
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingPredicate {
    #[default]
    Any,
    SingleRouting,
    MultiRouting,
}

/// 模式结构体
///
/// 子模式按位置与节点输入一一对应。
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    pub node: Option<MatchNode>,
    pub dependencies: Vec<Pattern>,
    pub routing: RoutingPredicate,
}

impl Pattern {
    /// 空模式，匹配任何节点
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(node: MatchNode) -> Self {
        Self {
            node: Some(node),
            ..Self::default()
        }
    }

    pub fn new_with_kind(kind: PlanKind) -> Self {
        Self::with_node(MatchNode::Single(kind))
    }

    pub fn multi(kinds: Vec<PlanKind>) -> Self {
        Self::with_node(MatchNode::Multi(kinds))
    }

    pub fn with_dependency(mut self, dependency: Pattern) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_dependency_kind(self, kind: PlanKind) -> Self {
        self.with_dependency(Pattern::new_with_kind(kind))
    }

    pub fn with_routing(mut self, routing: RoutingPredicate) -> Self {
        self.routing = routing;
        self
    }

    /// 父节点类型，注册表以此为键
    pub fn root_kind(&self) -> Option<PlanKind> {
        self.node.as_ref().and_then(MatchNode::as_single)
    }

    /// 检查模式是否匹配给定的计划节点
    pub fn matches(&self, plan: &LogicalPlan, ctx: &RewriteContext<'_>) -> bool {
        if let Some(node) = &self.node {
            if !node.matches(plan.kind()) {
                return false;
            }
        }

        if !self.routing_matches(plan, ctx) {
            return false;
        }

        if self.dependencies.is_empty() {
            return true;
        }

        let inputs = plan.inputs();
        if inputs.len() < self.dependencies.len() {
            return false;
        }
        self.dependencies
            .iter()
            .zip(inputs)
            .all(|(dependency, input)| dependency.matches(input, ctx))
    }

    fn routing_matches(&self, plan: &LogicalPlan, ctx: &RewriteContext<'_>) -> bool {
        let Some(scan) = plan.as_scan() else {
            return self.routing == RoutingPredicate::Any;
        };
        match self.routing {
            RoutingPredicate::Any => true,
            RoutingPredicate::SingleRouting => ctx.is_single_routing(scan),
            RoutingPredicate::MultiRouting => !ctx.is_single_routing(scan),
        }
    }
}
