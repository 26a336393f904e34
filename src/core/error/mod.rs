//! 统一错误处理系统
//!
//! ## 设计理念
//!
//! 1. 验证错误使用结构化设计，保留错误类型标签与上下文
//! 2. 其余错误使用枚举，外部错误转换为字符串，降低模块耦合
//! 3. `DBResult<T>` 提供统一的返回类型
//!
//! 计划改写本身没有失败路径：规则无法匹配时保持输入不变。

use thiserror::Error;

pub mod codes;
pub mod validation;

pub use codes::{ErrorCode, PublicError, ToPublicError};
pub use validation::{ValidationError, ValidationErrorType};

use crate::sharding::ShardingRuleError;

/// 统一的错误类型
#[derive(Error, Debug, Clone)]
pub enum DBError {
    #[error("验证错误: {0}")]
    Validation(#[from] ValidationError),

    #[error("分片规则错误: {0}")]
    ShardingRule(#[from] ShardingRuleError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO错误: {0}")]
    Io(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 统一的结果类型
pub type DBResult<T> = Result<T, DBError>;

impl ToPublicError for DBError {
    fn to_public_error(&self) -> PublicError {
        PublicError::new(self.to_error_code(), self.to_public_message())
    }

    fn to_error_code(&self) -> ErrorCode {
        match self {
            DBError::Validation(e) => ErrorCode::from(e.error_type),
            DBError::ShardingRule(ShardingRuleError::UnroutableShardingValue { .. }) => {
                ErrorCode::ShardingKeyViolation
            }
            DBError::ShardingRule(_) | DBError::Config(_) => ErrorCode::ConfigurationError,
            DBError::Io(_) | DBError::Serialization(_) | DBError::Internal(_) => ErrorCode::InternalError,
        }
    }

    fn to_public_message(&self) -> String {
        match self {
            // 内部错误不暴露细节
            DBError::Internal(_) => "内部服务器错误".to_string(),
            DBError::Io(_) => "IO操作失败".to_string(),
            DBError::Validation(e) => e.message.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<std::io::Error> for DBError {
    fn from(err: std::io::Error) -> Self {
        DBError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DBError {
    fn from(err: serde_json::Error) -> Self {
        DBError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DBError {
    fn from(err: toml::de::Error) -> Self {
        DBError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DBError {
    fn from(err: toml::ser::Error) -> Self {
        DBError::Serialization(err.to_string())
    }
}
