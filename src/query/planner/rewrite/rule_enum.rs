//! 重写规则枚举 - 静态分发实现
//!
//! 所有规则作为枚举变体，通过 match 分发。注册表以父节点类型为键，
//! 重写器只尝试与当前节点类型对应的规则。

use std::collections::BTreeMap;

use crate::config::PlannerConfig;
use crate::query::planner::plan::{LogicalPlan, PlanKind};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::pushdown;
use crate::query::planner::rewrite::result::TransformResult;
use crate::query::planner::rewrite::rule::RewriteRule as RewriteRuleTrait;

macro_rules! define_rewrite_rules {
    (
        $(#[$enum_meta:meta])*
        pub enum $enum_name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant_name:ident($rule_type:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Debug)]
        pub enum $enum_name {
            $(
                $(#[$variant_meta])*
                $variant_name($rule_type),
            )+
        }

        impl $enum_name {
            pub fn name(&self) -> &'static str {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.name(),
                    )+
                }
            }

            pub fn pattern(&self) -> Pattern {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.pattern(),
                    )+
                }
            }

            pub fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
                match self {
                    $(
                        $enum_name::$variant_name(rule) => rule.apply(ctx, node),
                    )+
                }
            }

            pub fn matches(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> bool {
                self.pattern().matches(node, ctx)
            }
        }

        impl RewriteRuleTrait for $enum_name {
            fn name(&self) -> &'static str {
                self.name()
            }

            fn pattern(&self) -> Pattern {
                self.pattern()
            }

            fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult> {
                self.apply(ctx, node)
            }
        }
    };
}

define_rewrite_rules! {
    pub enum RewriteRule {
        PushFilterIntoScan(pushdown::PushFilterIntoScanRule),
        PushProjectIntoScan(pushdown::PushProjectIntoScanRule),
        PushAggregateIntoScan(pushdown::PushAggregateIntoScanRule),
        PushJoinIntoScan(pushdown::PushJoinIntoScanRule),
        PushSortIntoSingleRoutingScan(pushdown::PushSortIntoSingleRoutingScanRule),
        PushSortIntoMultiRoutingScan(pushdown::PushSortIntoMultiRoutingScanRule),
    }
}

/// 以父节点类型为键的规则注册表
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<PlanKind, Vec<RewriteRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按配置开关注册下推规则
    pub fn from_config(config: &PlannerConfig) -> Self {
        let mut registry = Self::new();
        if config.enable_filter_push_down {
            registry.add(RewriteRule::PushFilterIntoScan(pushdown::PushFilterIntoScanRule::new()));
        }
        if config.enable_projection_push_down {
            registry.add(RewriteRule::PushProjectIntoScan(pushdown::PushProjectIntoScanRule::new()));
        }
        if config.enable_aggregate_push_down {
            registry.add(RewriteRule::PushAggregateIntoScan(pushdown::PushAggregateIntoScanRule::new()));
        }
        if config.enable_join_push_down {
            registry.add(RewriteRule::PushJoinIntoScan(pushdown::PushJoinIntoScanRule::new()));
        }
        if config.enable_sort_push_down {
            registry.add(RewriteRule::PushSortIntoSingleRoutingScan(
                pushdown::PushSortIntoSingleRoutingScanRule::new(),
            ));
            registry.add(RewriteRule::PushSortIntoMultiRoutingScan(
                pushdown::PushSortIntoMultiRoutingScanRule::new(),
            ));
        }
        registry
    }

    /// 规则的模式必须声明单一父节点类型，否则忽略
    pub fn add(&mut self, rule: RewriteRule) {
        match rule.pattern().root_kind() {
            Some(kind) => self.rules.entry(kind).or_default().push(rule),
            None => log::warn!("规则 {} 未声明父节点类型，已忽略", rule.name()),
        }
    }

    pub fn rules_for(&self, kind: PlanKind) -> &[RewriteRule] {
        self.rules.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
