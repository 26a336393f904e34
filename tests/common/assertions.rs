//! 自定义断言辅助模块

use std::fmt::Debug;

use shardfed::core::error::{DBError, ValidationError, ValidationErrorType};

/// 断言结果成功，返回内部值
pub fn assert_ok<T, E: Debug>(result: Result<T, E>) -> T {
    result.expect("操作应该成功")
}

/// 断言验证失败且错误类型匹配
pub fn assert_validation_error<T: Debug>(result: Result<T, ValidationError>, expected: ValidationErrorType) {
    let err = result.expect_err("验证应该失败");
    assert_eq!(
        err.error_type, expected,
        "错误类型不匹配: 期望 {}, 实际 {} ({})",
        expected, err.error_type, err.message
    );
}

/// 断言管道返回的统一错误是指定类型的验证错误
pub fn assert_db_validation_error<T: Debug>(result: Result<T, DBError>, expected: ValidationErrorType) {
    match result.expect_err("操作应该失败") {
        DBError::Validation(err) => assert_eq!(err.error_type, expected, "{}", err.message),
        other => panic!("期望验证错误 {}, 实际 {}", expected, other),
    }
}

/// 断言集合包含指定数量的元素
pub fn assert_count<T>(collection: &[T], expected: usize, item_name: &str) {
    assert_eq!(
        collection.len(),
        expected,
        "{}数量不匹配: 期望 {}, 实际 {}",
        item_name,
        expected,
        collection.len()
    );
}
