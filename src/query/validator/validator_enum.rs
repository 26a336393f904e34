//! 验证器枚举
//!
//! 使用枚举统一管理所有分片语句验证器，替代 Box<dyn> 的动态分发

use std::sync::Arc;

use crate::core::error::ValidationError;
use crate::core::Value;
use crate::query::statement::{SqlStatement, StatementContext, StatementType};
use crate::query::validator::ddl::{CreateRoutineValidator, CreateTableValidator, CreateViewValidator};
use crate::query::validator::dml::{DeleteValidator, InsertValidator, SelectValidator, UpdateValidator};
use crate::query::validator::validator_trait::ShardingStatementValidator;
use crate::sharding::{RouteContext, SchemaMetadata, ShardingConditionEngine, ShardingRule};

/// 统一验证器枚举
#[derive(Debug, Clone)]
pub enum ShardingStatementValidatorEnum {
    Select(SelectValidator),
    Insert(InsertValidator),
    Update(UpdateValidator),
    Delete(DeleteValidator),
    CreateTable(CreateTableValidator),
    CreateView(CreateViewValidator),
    CreateRoutine(CreateRoutineValidator),
}

impl ShardingStatementValidatorEnum {
    /// 按语句类型创建验证器
    pub fn create(statement: &SqlStatement, condition_engine: Arc<dyn ShardingConditionEngine>) -> Self {
        match statement {
            SqlStatement::Select(_) => Self::Select(SelectValidator::new(condition_engine)),
            SqlStatement::Insert(_) => Self::Insert(InsertValidator::new()),
            SqlStatement::Update(_) => Self::Update(UpdateValidator::new()),
            SqlStatement::Delete(_) => Self::Delete(DeleteValidator::new()),
            SqlStatement::CreateTable(_) => Self::CreateTable(CreateTableValidator::new()),
            SqlStatement::CreateView(_) => Self::CreateView(CreateViewValidator::new()),
            SqlStatement::CreateRoutine(routine) => Self::CreateRoutine(CreateRoutineValidator::new(routine.kind)),
        }
    }

    fn inner(&self) -> &dyn ShardingStatementValidator {
        match self {
            Self::Select(v) => v,
            Self::Insert(v) => v,
            Self::Update(v) => v,
            Self::Delete(v) => v,
            Self::CreateTable(v) => v,
            Self::CreateView(v) => v,
            Self::CreateRoutine(v) => v,
        }
    }
}

impl ShardingStatementValidator for ShardingStatementValidatorEnum {
    fn statement_type(&self) -> StatementType {
        self.inner().statement_type()
    }

    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        parameters: &[Value],
        metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError> {
        match self {
            Self::Select(v) => v.pre_validate(rule, context, parameters, metadata),
            Self::Insert(v) => v.pre_validate(rule, context, parameters, metadata),
            Self::Update(v) => v.pre_validate(rule, context, parameters, metadata),
            Self::Delete(v) => v.pre_validate(rule, context, parameters, metadata),
            Self::CreateTable(v) => v.pre_validate(rule, context, parameters, metadata),
            Self::CreateView(v) => v.pre_validate(rule, context, parameters, metadata),
            Self::CreateRoutine(v) => v.pre_validate(rule, context, parameters, metadata),
        }
    }

    fn post_validate(&self, statement: &SqlStatement, route_context: &RouteContext) -> Result<(), ValidationError> {
        match self {
            Self::Select(v) => v.post_validate(statement, route_context),
            Self::Insert(v) => v.post_validate(statement, route_context),
            Self::Update(v) => v.post_validate(statement, route_context),
            Self::Delete(v) => v.post_validate(statement, route_context),
            Self::CreateTable(v) => v.post_validate(statement, route_context),
            Self::CreateView(v) => v.post_validate(statement, route_context),
            Self::CreateRoutine(v) => v.post_validate(statement, route_context),
        }
    }

    fn validator_name(&self) -> String {
        self.inner().validator_name()
    }
}
