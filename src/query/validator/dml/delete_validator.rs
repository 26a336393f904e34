//! DELETE 语句验证器

use crate::core::error::ValidationError;
use crate::core::Value;
use crate::query::statement::{SqlStatement, StatementContext, StatementType};
use crate::query::validator::dml::update_validator::validate_limit_route;
use crate::query::validator::helpers::validate_multiple_table;
use crate::query::validator::validator_trait::{rejected, ShardingStatementValidator};
use crate::sharding::{RouteContext, SchemaMetadata, ShardingRule};

#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteValidator;

impl DeleteValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ShardingStatementValidator for DeleteValidator {
    fn statement_type(&self) -> StatementType {
        StatementType::Delete
    }

    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        _parameters: &[Value],
        _metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let SqlStatement::Delete(delete) = &context.statement else {
            return Ok(());
        };
        validate_multiple_table(rule, "DELETE", &delete.table_names())
            .map_err(|e| rejected(&self.validator_name(), e))
    }

    fn post_validate(&self, statement: &SqlStatement, route_context: &RouteContext) -> Result<(), ValidationError> {
        validate_limit_route(statement, route_context).map_err(|e| rejected(&self.validator_name(), e))
    }
}
