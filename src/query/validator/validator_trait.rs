//! 分片语句验证器统一 trait
//!
//! 每个验证器提供路由前检查与路由后检查，只返回错误而不修改任何状态。

use crate::core::error::ValidationError;
use crate::core::Value;
use crate::query::statement::{SqlStatement, StatementContext, StatementType};
use crate::sharding::{RouteContext, SchemaMetadata, ShardingRule};

/// 分片语句验证器
pub trait ShardingStatementValidator {
    /// 获取语句类型
    fn statement_type(&self) -> StatementType;

    /// 路由前检查
    fn pre_validate(
        &self,
        rule: &ShardingRule,
        context: &StatementContext,
        parameters: &[Value],
        metadata: &dyn SchemaMetadata,
    ) -> Result<(), ValidationError>;

    /// 路由后检查
    /// 默认实现返回成功
    fn post_validate(&self, _statement: &SqlStatement, _route_context: &RouteContext) -> Result<(), ValidationError> {
        Ok(())
    }

    /// 获取验证器名称
    fn validator_name(&self) -> String {
        format!("{}Validator", self.statement_type().as_str())
    }
}

/// 记录被拒绝的语句
pub(crate) fn rejected(validator: &str, error: ValidationError) -> ValidationError {
    log::warn!("{} 拒绝语句 [{}]: {}", validator, error.tag(), error.message);
    error
}
