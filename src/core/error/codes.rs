//! 对外错误码定义
//!
//! 协议前端把内部错误映射为客户端错误包时使用的稳定错误码。
//!
//! 错误码格式: XXYY
//! - XX: 错误类别 (00=成功, 03=验证, 05=资源, 09=系统)
//! - YY: 具体错误

use serde::{Deserialize, Serialize};

use crate::core::error::validation::ValidationErrorType;

/// 对外错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    Success = 0,

    // ==================== 验证错误 (03xx) ====================
    /// 通用验证错误
    ValidationError = 300,
    /// 分片语义不支持的语句
    UnsupportedShardingStatement = 304,
    /// 分片键相关违规
    ShardingKeyViolation = 305,

    // ==================== 资源错误 (05xx) ====================
    /// 资源未找到
    ResourceNotFound = 500,
    /// 资源已存在
    ResourceAlreadyExists = 501,

    // ==================== 系统错误 (09xx) ====================
    /// 配置错误
    ConfigurationError = 902,
    /// 内部服务器错误
    InternalError = 900,
}

impl ErrorCode {
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::Success),
            300 => Some(ErrorCode::ValidationError),
            304 => Some(ErrorCode::UnsupportedShardingStatement),
            305 => Some(ErrorCode::ShardingKeyViolation),
            500 => Some(ErrorCode::ResourceNotFound),
            501 => Some(ErrorCode::ResourceAlreadyExists),
            900 => Some(ErrorCode::InternalError),
            902 => Some(ErrorCode::ConfigurationError),
            _ => None,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "成功",
            ErrorCode::ValidationError => "验证错误",
            ErrorCode::UnsupportedShardingStatement => "分片环境下不支持该语句",
            ErrorCode::ShardingKeyViolation => "分片键违规",
            ErrorCode::ResourceNotFound => "资源未找到",
            ErrorCode::ResourceAlreadyExists => "资源已存在",
            ErrorCode::ConfigurationError => "配置错误",
            ErrorCode::InternalError => "内部服务器错误",
        }
    }

    /// 判断错误是否可重试
    ///
    /// 分片语义错误代表语句本身无法正确执行，全部不可重试
    pub fn is_retryable(&self) -> bool {
        false
    }
}

impl From<ValidationErrorType> for ErrorCode {
    fn from(error_type: ValidationErrorType) -> Self {
        match error_type {
            ValidationErrorType::TableAlreadyExists => ErrorCode::ResourceAlreadyExists,
            ValidationErrorType::TableDoesNotExist => ErrorCode::ResourceNotFound,
            ValidationErrorType::ShardingKeyUpdateForbidden
            | ValidationErrorType::DuplicateKeyUpdateOnShardingColumn
            | ValidationErrorType::MissingShardingColumnWithSubquery
            | ValidationErrorType::AmbiguousSubqueryShardingValue
            | ValidationErrorType::MissingGeneratedKeyInInsertSelect => ErrorCode::ShardingKeyViolation,
            ValidationErrorType::UnsupportedMultiTableStatement
            | ValidationErrorType::LimitForbiddenWithMultiRoute
            | ValidationErrorType::InsertSelectTableViolation
            | ValidationErrorType::ShardingTableInRoutine
            | ValidationErrorType::UnsupportedShardingView => ErrorCode::UnsupportedShardingStatement,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.default_message())
    }
}

/// 对外错误信息 - 用于序列化到响应中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicError {
    pub code: ErrorCode,
    pub message: String,
}

impl PublicError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// 内部错误到对外错误的转换 trait
pub trait ToPublicError {
    fn to_public_error(&self) -> PublicError;

    fn to_error_code(&self) -> ErrorCode;

    /// 获取对外错误消息（过滤敏感信息）
    fn to_public_message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_i32() {
        assert_eq!(ErrorCode::from_i32(0), Some(ErrorCode::Success));
        assert_eq!(ErrorCode::from_i32(501), Some(ErrorCode::ResourceAlreadyExists));
        assert_eq!(ErrorCode::from_i32(12345), None);
    }

    #[test]
    fn test_validation_type_mapping() {
        assert_eq!(ErrorCode::from(ValidationErrorType::TableDoesNotExist), ErrorCode::ResourceNotFound);
        assert_eq!(
            ErrorCode::from(ValidationErrorType::LimitForbiddenWithMultiRoute),
            ErrorCode::UnsupportedShardingStatement
        );
        assert!(!ErrorCode::ShardingKeyViolation.is_retryable());
    }
}
