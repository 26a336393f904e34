//! UPDATE 语句验证器
//!
//! 分片列只能被 SET 为 WHERE 中已确定的同一个值；
//! WHERE 的每个 OR 分支都必须给出相等的值。

use crate::core::error::{ValidationError, ValidationErrorType};
use crate::core::Value;
use crate::query::statement::{Assignment, SqlStatement, StatementContext, StatementType, UpdateStatement};
use crate::query::validator::helpers::{validate_multiple_table, where_value_of};
use crate::query::validator::validator_trait::{rejected, ShardingStatementValidator};
use crate::sharding::{RouteContext, SchemaMetadata, ShardingRule};

#[derive(Debug, Default, Clone, Copy)]
pub struct UpdateValidator;

impl UpdateValidator {
    pub fn new() -> Self {
        Self
    }

    /// 赋值列所属的表
    fn assignment_table<'a>(&self, rule: &ShardingRule, update: &'a UpdateStatement, assignment: &Assignment) -> Option<&'a str> {
        match &assignment.column.table {
            Some(qualifier) => update
                .tables
                .iter()
                .find(|t| t.matches_qualifier(qualifier))
                .map(|t| t.name.as_str()),
            None => update
                .tables
                .iter()
                .map(|t| t.name.as_str())
                .find(|t| rule.is_sharding_column(&assignment.column.name, t)),
        }
    }

    fn validate_sharding_key_update(
        &self,
        rule: &ShardingRule,
        update: &UpdateStatement,
        parameters: &[Value],
    ) -> Result<(), ValidationError> {
        for assignment in &update.assignments {
            let Some(table) = self.assignment_table(rule, update, assignment) else {
                continue;
            };
            if !rule.is_sharding_column(&assignment.column.name, table) {
                continue;
            }
            let set_value = assignment.value.resolve_value(parameters);
            let unchanged = match (&set_value, &update.where_clause) {
                (Some(set_value), Some(where_clause)) => where_clause.split_disjunction().into_iter().all(|group| {
                    let table_matches = |qualifier: &str| {
                        update
                            .tables
                            .iter()
                            .any(|t| t.name.eq_ignore_ascii_case(table) && t.matches_qualifier(qualifier))
                    };
                    where_value_of(group, &assignment.column, table_matches, parameters)
                        .is_some_and(|where_value| where_value.sql_equals(set_value))
                }),
                _ => false,
            };
            if !unchanged {
                return Err(ValidationError::new(
                    format!("Can not update sharding key `{}` of `{}`", assignment.column.name, table),
                    ValidationErrorType::ShardingKeyUpdateForbidden,
                )
                .with_context(table));
            }
        }
        Ok(())
    }
}

impl ShardingStatementValidator for UpdateValidator {
    fn statement_type(&self) -> StatementType {
        StatementType::Update
    }

    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        parameters: &[Value],
        _metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        let SqlStatement::Update(update) = &context.statement else {
            return Ok(());
        };
        validate_multiple_table(rule, "UPDATE", &update.table_names())
            .and_then(|_| self.validate_sharding_key_update(rule, update, parameters))
            .map_err(|e| rejected(&self.validator_name(), e))
    }

    fn post_validate(&self, statement: &SqlStatement, route_context: &RouteContext) -> Result<(), ValidationError> {
        validate_limit_route(statement, route_context).map_err(|e| rejected(&self.validator_name(), e))
    }
}

/// 多路由单元时禁止 LIMIT
pub(crate) fn validate_limit_route(statement: &SqlStatement, route_context: &RouteContext) -> Result<(), ValidationError> {
    if statement.limit().is_some() && route_context.route_unit_count() > 1 {
        return Err(ValidationError::new(
            format!(
                "{} with LIMIT can not be routed to {} units",
                statement.statement_type().as_str(),
                route_context.route_unit_count()
            ),
            ValidationErrorType::LimitForbiddenWithMultiRoute,
        ));
    }
    Ok(())
}
