//! CREATE FUNCTION / CREATE PROCEDURE 语句验证器
//!
//! 例程体无法表达按分片改写的 DDL，因此其中引用的表必须存在且不能是分片表，
//! 例程体中新建的表必须不存在。

use crate::core::error::{ValidationError, ValidationErrorType};
use crate::core::Value;
use crate::query::statement::{CreateRoutineStatement, RoutineKind, SqlStatement, StatementContext, StatementType};
use crate::query::validator::helpers::{validate_table_exist, validate_table_not_exist};
use crate::query::validator::validator_trait::{rejected, ShardingStatementValidator};
use crate::sharding::{SchemaMetadata, ShardingRule};

#[derive(Debug, Clone, Copy)]
pub struct CreateRoutineValidator {
    kind: RoutineKind,
}

impl CreateRoutineValidator {
    pub fn new(kind: RoutineKind) -> Self {
        Self { kind }
    }

    fn validate(&self, rule: &ShardingRule, routine: &CreateRoutineStatement, metadata: &dyn SchemaMetadata) -> Result<(), ValidationError> {
        if let Some(table) = routine
            .referenced_tables
            .iter()
            .find(|t| rule.is_sharding_table(&t.name))
        {
            return Err(ValidationError::new(
                format!("Routine `{}` can not reference sharding table `{}`", routine.name, table.name),
                ValidationErrorType::ShardingTableInRoutine,
            )
            .with_context(table.name.as_str()));
        }
        validate_table_exist(metadata, &routine.referenced_tables)?;
        validate_table_not_exist(metadata, &routine.created_tables)
    }
}

impl ShardingStatementValidator for CreateRoutineValidator {
    fn statement_type(&self) -> StatementType {
        match self.kind {
            RoutineKind::Function => StatementType::CreateFunction,
            RoutineKind::Procedure => StatementType::CreateProcedure,
        }
    }

    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        _parameters: &[Value],
        metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let SqlStatement::CreateRoutine(routine) = &context.statement else {
            return Ok(());
        };
        self.validate(rule, routine, metadata)
            .map_err(|e| rejected(&self.validator_name(), e))
    }
}
