//! 重写上下文定义
//!
//! 规则需要的分片规则、参数、条件引擎与 Hint 值都通过上下文显式传入，
//! 规则本身不访问任何全局状态。

use crate::core::Value;
use crate::query::planner::plan::LogicalScan;
use crate::query::statement::SelectStatement;
use crate::sharding::{
    HintValues, RouteUnit, ShardingConditionEngine, ShardingConditions, ShardingRouter, ShardingRule,
    ShardingRuleError,
};

/// 重写上下文
///
/// 每条语句创建一次，规划结束后丢弃。
#[derive(Debug)]
pub struct RewriteContext<'a> {
    rule: &'a ShardingRule,
    schema: &'a str,
    parameters: &'a [Value],
    condition_engine: &'a dyn ShardingConditionEngine,
    hint: &'a HintValues,
    /// 已应用规则的名称，按应用顺序
    applied_rules: Vec<&'static str>,
}

impl<'a> RewriteContext<'a> {
    pub fn new(
        rule: &'a ShardingRule,
        schema: &'a str,
        parameters: &'a [Value],
        condition_engine: &'a dyn ShardingConditionEngine,
        hint: &'a HintValues,
    ) -> Self {
        Self {
            rule,
            schema,
            parameters,
            condition_engine,
            hint,
            applied_rules: Vec::new(),
        }
    }

    pub fn sharding_rule(&self) -> &'a ShardingRule {
        self.rule
    }

    /// 当前逻辑库
    pub fn schema(&self) -> &'a str {
        self.schema
    }

    pub fn parameters(&self) -> &'a [Value] {
        self.parameters
    }

    pub fn hint(&self) -> &'a HintValues {
        self.hint
    }

    pub fn router(&self) -> ShardingRouter<'a> {
        ShardingRouter::new(self.rule, self.hint)
    }

    /// 扫描自身谓词上的分片条件
    ///
    /// 每个下推的过滤单独提取，再按合取合并；没有谓词的扫描不受约束，路由到全部分片。
    pub fn scan_conditions(&self, scan: &LogicalScan) -> ShardingConditions {
        scan.routing_predicates()
            .into_iter()
            .fold(ShardingConditions::empty(), |acc, (tables, predicate)| {
                let block = SelectStatement::new(tables.to_vec()).with_where(predicate.clone());
                let extracted = self
                    .condition_engine
                    .create_sharding_conditions(self.rule, &block, self.parameters);
                acc.and(&extracted)
            })
    }

    /// 扫描的路由单元，每次调用都重新计算
    pub fn route_units(&self, scan: &LogicalScan) -> Result<Vec<RouteUnit>, ShardingRuleError> {
        scan.route_units(&self.router(), &self.scan_conditions(scan))
    }

    pub fn is_single_routing(&self, scan: &LogicalScan) -> bool {
        scan.is_single_routing(&self.router(), &self.scan_conditions(scan))
    }

    pub fn record_applied(&mut self, rule_name: &'static str) {
        self.applied_rules.push(rule_name);
    }

    pub fn applied_rules(&self) -> &[&'static str] {
        &self.applied_rules
    }
}
