//! INSERT 语句验证器

use crate::core::error::{ValidationError, ValidationErrorType};
use crate::core::Value;
use crate::query::statement::{InsertStatement, SqlStatement, StatementContext, StatementType};
use crate::query::validator::validator_trait::{rejected, ShardingStatementValidator};
use crate::sharding::{SchemaMetadata, ShardingRule};

#[derive(Debug, Default, Clone, Copy)]
pub struct InsertValidator;

impl InsertValidator {
    pub fn new() -> Self {
        Self
    }

    /// 分片列不能通过 ON DUPLICATE KEY UPDATE 修改
    fn validate_on_duplicate_key(&self, rule: &ShardingRule, insert: &InsertStatement) -> Result<(), ValidationError> {
        let table = &insert.table.name;
        match insert
            .on_duplicate_key_update
            .iter()
            .find(|assignment| rule.is_sharding_column(&assignment.column.name, table))
        {
            Some(assignment) => Err(ValidationError::new(
                format!(
                    "ON DUPLICATE KEY UPDATE can not update sharding column `{}` of `{}`",
                    assignment.column.name, table
                ),
                ValidationErrorType::DuplicateKeyUpdateOnShardingColumn,
            )
            .with_context(table.as_str())),
            None => Ok(()),
        }
    }

    /// INSERT ... SELECT 的显式列清单必须包含生成键列
    fn validate_generated_key(&self, rule: &ShardingRule, insert: &InsertStatement) -> Result<(), ValidationError> {
        let table = &insert.table.name;
        match rule.find_generate_key_column(table) {
            Some(key) if !insert.columns.is_empty() && !insert.contains_column(key) => Err(ValidationError::new(
                format!("INSERT INTO ... SELECT can not support applying key generator with absent generate key column `{}`", key),
                ValidationErrorType::MissingGeneratedKeyInInsertSelect,
            )
            .with_context(table.as_str())),
            _ => Ok(()),
        }
    }

    /// 目标表与来源中的分片表必须同属一个绑定组，广播表不参与判断
    fn validate_select_tables(&self, rule: &ShardingRule, insert: &InsertStatement) -> Result<(), ValidationError> {
        let tables: Vec<String> = insert
            .all_table_names()
            .into_iter()
            .filter(|t| !rule.is_broadcast_table(t))
            .collect();
        if rule.is_all_binding_tables(&tables) {
            return Ok(());
        }
        Err(ValidationError::new(
            format!(
                "INSERT INTO ... SELECT can not support applying across non-binding tables: {}",
                tables.join(", ")
            ),
            ValidationErrorType::InsertSelectTableViolation,
        ))
    }

    fn validate(&self, rule: &ShardingRule, insert: &InsertStatement) -> Result<(), ValidationError> {
        self.validate_on_duplicate_key(rule, insert)?;
        if insert.select.is_some() && rule.is_sharding_table(&insert.table.name) {
            self.validate_generated_key(rule, insert)?;
            self.validate_select_tables(rule, insert)?;
        }
        Ok(())
    }
}

impl ShardingStatementValidator for InsertValidator {
    fn statement_type(&self) -> StatementType {
        StatementType::Insert
    }

    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        _parameters: &[Value],
        _metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let SqlStatement::Insert(insert) = &context.statement else {
            return Ok(());
        };
        self.validate(rule, insert)
            .map_err(|e| rejected(&self.validator_name(), e))
    }
}
