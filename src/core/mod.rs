pub mod error;
pub mod types;
pub mod value;

// 错误和结果类型
pub use error::{DBError, DBResult, ValidationError, ValidationErrorType};

// 核心数据类型
pub use value::Value;

// 表达式系统类型
pub use types::expression::{ColumnRef, Expression};
pub use types::operators::{AggregateFunction, BinaryOperator};
