//! 验证引擎
//!
//! 路由前执行 pre_validate，路由后执行 post_validate。

use std::sync::Arc;

use log::debug;

use crate::core::error::ValidationError;
use crate::core::Value;
use crate::query::statement::{SqlStatement, StatementContext};
use crate::query::validator::validator_enum::ShardingStatementValidatorEnum;
use crate::query::validator::validator_trait::ShardingStatementValidator;
use crate::sharding::{RouteContext, SchemaMetadata, ShardingConditionEngine, ShardingRule, WhereClauseConditionEngine};

#[derive(Debug, Clone)]
pub struct ValidationEngine {
    condition_engine: Arc<dyn ShardingConditionEngine>,
}

impl ValidationEngine {
    pub fn new(condition_engine: Arc<dyn ShardingConditionEngine>) -> Self {
        Self { condition_engine }
    }

    pub fn condition_engine(&self) -> &Arc<dyn ShardingConditionEngine> {
        &self.condition_engine
    }

    pub fn validator_for(&self, statement: &SqlStatement) -> ShardingStatementValidatorEnum {
        ShardingStatementValidatorEnum::create(statement, Arc::clone(&self.condition_engine))
    }

    pub fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        parameters: &[Value],
        metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let validator = self.validator_for(&context.statement);
        debug!("{} 路由前检查", validator.validator_name());
        validator.pre_validate(rule, context, parameters, metadata)
    }

    pub fn post_validate(&self, statement: &SqlStatement, route_context: &RouteContext) -> Result<(), ValidationError> {
        let validator = self.validator_for(statement);
        debug!(
            "{} 路由后检查，路由单元数 {}",
            validator.validator_name(),
            route_context.route_unit_count()
        );
        validator.post_validate(statement, route_context)
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new(Arc::new(WhereClauseConditionEngine))
    }
}
