//! 核心类型定义

pub mod expression;
pub mod operators;

pub use expression::{ColumnRef, Expression};
pub use operators::{AggregateFunction, BinaryOperator};
