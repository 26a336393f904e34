//! SELECT 语句验证器
//!
//! 带子查询的查询必须能提取到分片值，且各分支命中同一分片。

use std::sync::Arc;

use log::debug;

use crate::core::error::{ValidationError, ValidationErrorType};
use crate::core::Value;
use crate::query::statement::{SelectStatement, SqlStatement, StatementContext, StatementType};
use crate::query::validator::helpers::is_same_sharding_condition;
use crate::query::validator::validator_trait::{rejected, ShardingStatementValidator};
use crate::sharding::{SchemaMetadata, ShardingConditionEngine, ShardingRule};

#[derive(Debug, Clone)]
pub struct SelectValidator {
    condition_engine: Arc<dyn ShardingConditionEngine>,
}

impl SelectValidator {
    pub fn new(condition_engine: Arc<dyn ShardingConditionEngine>) -> Self {
        Self { condition_engine }
    }

    /// 唯一的逻辑表完全由 Hint 路由，且两个维度的 Hint 值都已给出
    fn is_hint_routed(&self, rule: &ShardingRule, select: &SelectStatement, context: &StatementContext) -> bool {
        let tables = select.all_table_names();
        if tables.len() != 1 || !context.hint.is_complete() {
            return false;
        }
        rule.find_table_rule(&tables[0])
            .is_some_and(|table_rule| table_rule.is_hint_routed())
    }

    fn validate_subquery_condition(
        &self,
        rule: &ShardingRule,
        select: &SelectStatement,
        parameters: &[Value],
    ) -> Result<(), ValidationError> {
        if !rule.contains_sharding_table(&select.all_table_names()) {
            return Ok(());
        }
        let conditions = self
            .condition_engine
            .create_sharding_conditions(rule, select, parameters);
        // 任一 OR 分支缺少分片值时，整条语句都无法限定在分片上
        let branches = conditions.non_empty_branches();
        if branches.is_empty() || conditions.has_unconstrained_branch() {
            return Err(ValidationError::new(
                "Must have sharding column with subquery",
                ValidationErrorType::MissingShardingColumnWithSubquery,
            ));
        }
        if branches.len() > 1 && !is_same_sharding_condition(rule, &branches) {
            return Err(ValidationError::new(
                "Sharding value must same with subquery",
                ValidationErrorType::AmbiguousSubqueryShardingValue,
            ));
        }
        Ok(())
    }
}

impl ShardingStatementValidator for SelectValidator {
    fn statement_type(&self) -> StatementType {
        StatementType::Select
    }

    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        parameters: &[Value],
        _metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let SqlStatement::Select(select) = &context.statement else {
            return Ok(());
        };
        if self.is_hint_routed(rule, select, context) {
            debug!("Hint 路由的查询跳过分片条件检查");
            return Ok(());
        }
        if !select.contains_subquery() {
            return Ok(());
        }
        self.validate_subquery_condition(rule, select, parameters)
            .map_err(|e| rejected(&self.validator_name(), e))
    }
}
