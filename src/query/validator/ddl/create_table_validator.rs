//! CREATE TABLE 语句验证器

use crate::core::error::ValidationError;
use crate::core::Value;
use crate::query::statement::{SqlStatement, StatementContext, StatementType};
use crate::query::validator::helpers::{validate_table_exist, validate_table_not_exist};
use crate::query::validator::validator_trait::{rejected, ShardingStatementValidator};
use crate::sharding::{SchemaMetadata, ShardingRule};

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateTableValidator;

impl CreateTableValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ShardingStatementValidator for CreateTableValidator {
    fn statement_type(&self) -> StatementType {
        StatementType::CreateTable
    }

    fn pre_validate(
        &self,
        _rule: &ShardingRule,
        context: &StatementContext,
        _parameters: &[Value],
        metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let SqlStatement::CreateTable(create) = &context.statement else {
            return Ok(());
        };
        let result = validate_table_exist(metadata, create.like_table.as_ref()).and_then(|_| {
            if create.if_not_exists {
                Ok(())
            } else {
                validate_table_not_exist(metadata, [&create.table])
            }
        });
        result.map_err(|e| rejected(&self.validator_name(), e))
    }
}
