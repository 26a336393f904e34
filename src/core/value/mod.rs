//! Value 模块 - 标量值类型系统
//!
//! - 核心类型定义 (`types.rs`)
//! - 比较逻辑 (`comparison.rs`)

pub mod comparison;
pub mod types;

pub use types::*;
