//! 行数边界（OFFSET / FETCH）
//!
//! 边界在规划期可能只是参数标记，此时以符号和的形式保留到执行期求值。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowBound {
    Literal(u64),
    /// 参数标记位置
    Parameter(usize),
    Plus(Box<RowBound>, Box<RowBound>),
}

impl RowBound {
    /// 两个字面量立即相加，否则构造符号和
    pub fn plus(left: RowBound, right: RowBound) -> RowBound {
        match (&left, &right) {
            (RowBound::Literal(a), RowBound::Literal(b)) => RowBound::Literal(a.saturating_add(*b)),
            _ => RowBound::Plus(Box::new(left), Box::new(right)),
        }
    }

    /// 下推到每个分片的行数上限：offset + fetch
    pub fn pushed_fetch(offset: Option<&RowBound>, fetch: &RowBound) -> RowBound {
        match offset {
            Some(offset) => RowBound::plus(offset.clone(), fetch.clone()),
            None => fetch.clone(),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, RowBound::Literal(_))
    }

    /// 执行期求值；参数缺失或不是非负整数时返回 None
    pub fn evaluate(&self, parameters: &[Value]) -> Option<u64> {
        match self {
            RowBound::Literal(value) => Some(*value),
            RowBound::Parameter(index) => parameters.get(*index)?.as_row_count(),
            RowBound::Plus(left, right) => Some(left.evaluate(parameters)?.saturating_add(right.evaluate(parameters)?)),
        }
    }
}

impl fmt::Display for RowBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowBound::Literal(value) => write!(f, "{}", value),
            RowBound::Parameter(index) => write!(f, "?{}", index),
            RowBound::Plus(left, right) => write!(f, "({} + {})", left, right),
        }
    }
}
