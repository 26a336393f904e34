//! 验证错误类型
//!
//! 分片语句验证器抛出的语义错误。所有错误都不可重试，
//! 在任何分片 I/O 发生前同步返回给调用方。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 验证错误类型枚举
///
/// 每个变体对应一种被违反的分布式改写不变量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorType {
    /// DML/查询涉及多个逻辑表
    UnsupportedMultiTableStatement,
    /// 修改分片键的有效值
    ShardingKeyUpdateForbidden,
    /// 多路由单元上的 LIMIT
    LimitForbiddenWithMultiRoute,
    TableAlreadyExists,
    TableDoesNotExist,
    /// 子查询各分支的分片值不一致
    AmbiguousSubqueryShardingValue,
    /// 子查询缺少分片键
    MissingShardingColumnWithSubquery,
    /// ON DUPLICATE KEY UPDATE 修改分片列
    DuplicateKeyUpdateOnShardingColumn,
    /// INSERT ... SELECT 省略了自增主键列
    MissingGeneratedKeyInInsertSelect,
    /// INSERT ... SELECT 的分片表不属于同一绑定组
    InsertSelectTableViolation,
    /// 函数/存储过程体引用了分片表
    ShardingTableInRoutine,
    /// 视图跨越非绑定的分片表
    UnsupportedShardingView,
}

impl ValidationErrorType {
    /// 稳定的机器可读标签
    pub fn tag(&self) -> &'static str {
        match self {
            ValidationErrorType::UnsupportedMultiTableStatement => "unsupported-multi-table-statement",
            ValidationErrorType::ShardingKeyUpdateForbidden => "sharding-key-update-forbidden",
            ValidationErrorType::LimitForbiddenWithMultiRoute => "limit-forbidden-with-multi-route",
            ValidationErrorType::TableAlreadyExists => "table-already-exists",
            ValidationErrorType::TableDoesNotExist => "table-does-not-exist",
            ValidationErrorType::AmbiguousSubqueryShardingValue => "ambiguous-subquery-sharding-value",
            ValidationErrorType::MissingShardingColumnWithSubquery => "missing-sharding-column-with-subquery",
            ValidationErrorType::DuplicateKeyUpdateOnShardingColumn => "duplicate-key-update-on-sharding-column",
            ValidationErrorType::MissingGeneratedKeyInInsertSelect => "missing-generated-key-in-insert-select",
            ValidationErrorType::InsertSelectTableViolation => "insert-select-table-violation",
            ValidationErrorType::ShardingTableInRoutine => "sharding-table-in-routine",
            ValidationErrorType::UnsupportedShardingView => "unsupported-sharding-view",
        }
    }
}

impl fmt::Display for ValidationErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationErrorType::UnsupportedMultiTableStatement => write!(f, "不支持的多表语句"),
            ValidationErrorType::ShardingKeyUpdateForbidden => write!(f, "禁止修改分片键"),
            ValidationErrorType::LimitForbiddenWithMultiRoute => write!(f, "多路由禁止使用LIMIT"),
            ValidationErrorType::TableAlreadyExists => write!(f, "表已存在"),
            ValidationErrorType::TableDoesNotExist => write!(f, "表不存在"),
            ValidationErrorType::AmbiguousSubqueryShardingValue => write!(f, "子查询分片值不一致"),
            ValidationErrorType::MissingShardingColumnWithSubquery => write!(f, "子查询缺少分片键"),
            ValidationErrorType::DuplicateKeyUpdateOnShardingColumn => write!(f, "重复键更新分片列"),
            ValidationErrorType::MissingGeneratedKeyInInsertSelect => write!(f, "缺少生成键列"),
            ValidationErrorType::InsertSelectTableViolation => write!(f, "INSERT SELECT表违规"),
            ValidationErrorType::ShardingTableInRoutine => write!(f, "例程引用分片表"),
            ValidationErrorType::UnsupportedShardingView => write!(f, "不支持的分片视图"),
        }
    }
}

/// 统一验证错误结构
///
/// 包含错误类型、错误消息和可选的上下文（通常是逻辑表名）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub error_type: ValidationErrorType,
    pub context: Option<String>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, error_type: ValidationErrorType) -> Self {
        Self {
            message: message.into(),
            error_type,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn tag(&self) -> &'static str {
        self.error_type.tag()
    }

    pub fn unsupported_multi_table(kind: &str, tables: &[String]) -> Self {
        Self::new(
            format!("Cannot support multiple logic tables in {} statement: {}", kind, tables.join(", ")),
            ValidationErrorType::UnsupportedMultiTableStatement,
        )
    }

    pub fn table_exists(table: &str) -> Self {
        Self::new(format!("Table or view `{}` already exists", table), ValidationErrorType::TableAlreadyExists)
            .with_context(table)
    }

    pub fn table_not_exists(table: &str) -> Self {
        Self::new(format!("Table or view `{}` does not exist", table), ValidationErrorType::TableDoesNotExist)
            .with_context(table)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ValidationError {}
