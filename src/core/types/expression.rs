//! 表达式定义
//!
//! 绑定后的标量表达式。列引用已经解析到逻辑表，参数标记使用从 0 开始的位置索引。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::operators::BinaryOperator;
use crate::core::value::Value;

/// 列引用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRef {
    /// 所属逻辑表名或别名
    pub table: Option<String>,
    pub name: String,
}

impl ColumnRef {
    pub fn new(table: Option<String>, name: impl Into<String>) -> Self {
        Self {
            table,
            name: name.into(),
        }
    }

    /// 列名是否匹配（不区分大小写）
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// 表达式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Column(ColumnRef),
    Literal(Value),
    /// 位置参数标记 `?`
    Parameter(usize),
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    InList {
        expr: Box<Expression>,
        list: Vec<Expression>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expression>,
        negated: bool,
    },
    Function {
        name: String,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column(ColumnRef::new(None, name))
    }

    pub fn qualified_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expression::Column(ColumnRef::new(Some(table.into()), name))
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn parameter(index: usize) -> Self {
        Expression::Parameter(index)
    }

    pub fn binary(op: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn equals(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOperator::Equal, left, right)
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOperator::And, left, right)
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::binary(BinaryOperator::Or, left, right)
    }

    pub fn in_list(expr: Expression, list: Vec<Expression>) -> Self {
        Expression::InList {
            expr: Box::new(expr),
            list,
            negated: false,
        }
    }

    /// 按顶层 OR 拆分为若干析取分支
    pub fn split_disjunction(&self) -> Vec<&Expression> {
        let mut result = Vec::new();
        Self::collect_by_operator(self, BinaryOperator::Or, &mut result);
        result
    }

    /// 按顶层 AND 拆分为若干合取谓词
    pub fn split_conjunction(&self) -> Vec<&Expression> {
        let mut result = Vec::new();
        Self::collect_by_operator(self, BinaryOperator::And, &mut result);
        result
    }

    fn collect_by_operator<'a>(expr: &'a Expression, target: BinaryOperator, out: &mut Vec<&'a Expression>) {
        match expr {
            Expression::Binary { op, left, right } if *op == target => {
                Self::collect_by_operator(left, target, out);
                Self::collect_by_operator(right, target, out);
            }
            other => out.push(other),
        }
    }

    /// 解析字面量或参数标记的值；其他表达式返回 None
    pub fn resolve_value(&self, parameters: &[Value]) -> Option<Value> {
        match self {
            Expression::Literal(value) if !value.is_null() => Some(value.clone()),
            Expression::Parameter(index) => parameters.get(*index).filter(|v| !v.is_null()).cloned(),
            _ => None,
        }
    }

    /// 收集表达式中所有的列引用
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut result = Vec::new();
        self.collect_columns(&mut result);
        result
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        match self {
            Expression::Column(column) => out.push(column),
            Expression::Literal(_) | Expression::Parameter(_) => {}
            Expression::Binary { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Expression::InList { expr, list, .. } => {
                expr.collect_columns(out);
                for item in list {
                    item.collect_columns(out);
                }
            }
            Expression::IsNull { expr, .. } => expr.collect_columns(out),
            Expression::Function { args, .. } => {
                for arg in args {
                    arg.collect_columns(out);
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Column(column) => match &column.table {
                Some(table) => write!(f, "{}.{}", table, column.name),
                None => write!(f, "{}", column.name),
            },
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Parameter(index) => write!(f, "?{}", index),
            Expression::Binary { op, left, right } => write!(f, "({} {} {})", left, op.name(), right),
            Expression::InList { expr, list, negated } => {
                let items: Vec<String> = list.iter().map(|e| e.to_string()).collect();
                let keyword = if *negated { "NOT IN" } else { "IN" };
                write!(f, "{} {} ({})", expr, keyword, items.join(", "))
            }
            Expression::IsNull { expr, negated } => {
                if *negated {
                    write!(f, "{} IS NOT NULL", expr)
                } else {
                    write!(f, "{} IS NULL", expr)
                }
            }
            Expression::Function { name, args } => {
                let items: Vec<String> = args.iter().map(|e| e.to_string()).collect();
                write!(f, "{}({})", name, items.join(", "))
            }
        }
    }
}
