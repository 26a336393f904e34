//! 排序规则
//!
//! 按输出列位置描述排序，合并排序直接用它比较各分片的行。

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullDirection {
    First,
    Last,
}

/// 单列排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldCollation {
    pub field_index: usize,
    pub direction: SortDirection,
    pub null_direction: NullDirection,
}

impl FieldCollation {
    /// 升序默认 NULL 在后
    pub fn asc(field_index: usize) -> Self {
        Self {
            field_index,
            direction: SortDirection::Ascending,
            null_direction: NullDirection::Last,
        }
    }

    /// 降序默认 NULL 在前
    pub fn desc(field_index: usize) -> Self {
        Self {
            field_index,
            direction: SortDirection::Descending,
            null_direction: NullDirection::First,
        }
    }

    pub fn with_null_direction(mut self, null_direction: NullDirection) -> Self {
        self.null_direction = null_direction;
        self
    }

    pub fn compare(&self, left: &[Value], right: &[Value]) -> Ordering {
        let (a, b) = match (left.get(self.field_index), right.get(self.field_index)) {
            (Some(a), Some(b)) => (a, b),
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
        };
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => match self.null_direction {
                NullDirection::First => Ordering::Less,
                NullDirection::Last => Ordering::Greater,
            },
            (false, true) => match self.null_direction {
                NullDirection::First => Ordering::Greater,
                NullDirection::Last => Ordering::Less,
            },
            (false, false) => match self.direction {
                SortDirection::Ascending => a.sql_cmp(b),
                SortDirection::Descending => b.sql_cmp(a),
            },
        }
    }
}

/// 多列排序
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Collation {
    pub fields: Vec<FieldCollation>,
}

impl Collation {
    pub fn new(fields: Vec<FieldCollation>) -> Self {
        Self { fields }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn compare(&self, left: &[Value], right: &[Value]) -> Ordering {
        self.fields
            .iter()
            .map(|field| field.compare(left, right))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .fields
            .iter()
            .map(|field| {
                let direction = match field.direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                };
                format!("${} {}", field.field_index, direction)
            })
            .collect();
        write!(f, "[{}]", fields.join(", "))
    }
}
