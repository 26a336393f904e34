//! CREATE VIEW 语句验证器
//!
//! 视图引用的表必须存在；视图中的分片表必须同属一个绑定组。

use crate::core::error::{ValidationError, ValidationErrorType};
use crate::core::Value;
use crate::query::statement::{CreateViewStatement, SqlStatement, StatementContext, StatementType};
use crate::query::validator::helpers::{validate_table_exist, validate_table_not_exist};
use crate::query::validator::validator_trait::{rejected, ShardingStatementValidator};
use crate::sharding::{SchemaMetadata, ShardingRule};

#[derive(Debug, Default, Clone, Copy)]
pub struct CreateViewValidator;

impl CreateViewValidator {
    pub fn new() -> Self {
        Self
    }

    fn validate(&self, rule: &ShardingRule, view: &CreateViewStatement, metadata: &dyn SchemaMetadata) -> Result<(), ValidationError> {
        if !view.or_replace {
            validate_table_not_exist(metadata, [&view.view])?;
        }
        validate_table_exist(metadata, view.select.all_table_refs())?;

        let sharding_tables = rule.sharding_table_names(&view.select.all_table_names());
        if sharding_tables.len() > 1 && !rule.is_all_binding_tables(&sharding_tables) {
            return Err(ValidationError::new(
                format!(
                    "View `{}` can only be created over binding sharding tables, got: {}",
                    view.view.name,
                    sharding_tables.join(", ")
                ),
                ValidationErrorType::UnsupportedShardingView,
            )
            .with_context(view.view.name.as_str()));
        }
        Ok(())
    }
}

impl ShardingStatementValidator for CreateViewValidator {
    fn statement_type(&self) -> StatementType {
        StatementType::CreateView
    }

    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        _parameters: &[Value],
        metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let SqlStatement::CreateView(view) = &context.statement else {
            return Ok(());
        };
        self.validate(rule, view, metadata)
            .map_err(|e| rejected(&self.validator_name(), e))
    }
}
