//! 计划重写器实现
//!
//! 自底向上遍历计划树：先重写子节点，再对当前节点尝试注册表中对应的规则。
//! 一轮没有任何规则生效即到达不动点；轮数受 `max_rewrite_iterations` 限制。

use log::debug;

use crate::config::PlannerConfig;
use crate::query::planner::plan::LogicalPlan;
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::rule_enum::RuleRegistry;

/// 计划重写器
#[derive(Debug)]
pub struct PlanRewriter {
    registry: RuleRegistry,
    max_iterations: usize,
}

impl PlanRewriter {
    pub fn new(registry: RuleRegistry, max_iterations: usize) -> Self {
        Self {
            registry,
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(RuleRegistry::from_config(config), config.max_rewrite_iterations)
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// 重写到不动点
    pub fn rewrite(&self, ctx: &mut RewriteContext<'_>, plan: LogicalPlan) -> LogicalPlan {
        let mut current = plan;
        for iteration in 1..=self.max_iterations {
            let (next, changed) = self.rewrite_node(ctx, current);
            current = next;
            if !changed {
                debug!("重写在第 {} 轮到达不动点", iteration);
                return current;
            }
        }
        debug!("重写达到最大轮数 {}", self.max_iterations);
        current
    }

    fn rewrite_node(&self, ctx: &mut RewriteContext<'_>, node: LogicalPlan) -> (LogicalPlan, bool) {
        let mut changed = false;
        let mut node = node.map_inputs(|input| {
            let (input, input_changed) = self.rewrite_node(ctx, input);
            changed |= input_changed;
            input
        });

        // 规则生效后节点类型可能改变，继续尝试新类型对应的规则
        'apply: loop {
            for rule in self.registry.rules_for(node.kind()) {
                if !rule.matches(ctx, &node) {
                    continue;
                }
                if let Some(result) = rule.apply(ctx, &node) {
                    debug!("应用规则 {}", rule.name());
                    ctx.record_applied(rule.name());
                    node = result.into_node();
                    changed = true;
                    continue 'apply;
                }
            }
            break;
        }
        (node, changed)
    }
}

impl Default for PlanRewriter {
    fn default() -> Self {
        Self::from_config(&PlannerConfig::default())
    }
}
