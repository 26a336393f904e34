use super::types::Value;
use std::cmp::Ordering;

// 结构相等：类型不同即不等，NaN 与 NaN 视为相等
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => (a == b) || (a.is_nan() && b.is_nan()),
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// 数值安全的相等比较
    ///
    /// `Int(1)`、`BigInt(1)` 与 `Float(1.0)` 相等；NULL 不等于任何值（包括 NULL）。
    pub fn sql_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (a, b) if a.is_numeric() && b.is_numeric() => Self::cmp_numeric(a, b) == Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    /// 全序比较，用于排序与归并
    ///
    /// NULL 排在最前；数值跨类型比较；其余不同类型按类型优先级比较。
    pub fn sql_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (a, b) if a.is_numeric() && b.is_numeric() => Self::cmp_numeric(a, b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (a, b) => Self::type_priority(a).cmp(&Self::type_priority(b)),
        }
    }

    fn cmp_numeric(a: &Value, b: &Value) -> Ordering {
        if let (Some(x), Some(y)) = (a.integral(), b.integral()) {
            return x.cmp(&y);
        }
        let x = a.as_f64().unwrap_or(f64::NAN);
        let y = b.as_f64().unwrap_or(f64::NAN);
        x.total_cmp(&y)
    }

    fn integral(&self) -> Option<i128> {
        match self {
            Value::Int(v) => Some(i128::from(*v)),
            Value::BigInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    fn type_priority(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::BigInt(_) | Value::Float(_) => 2,
            Value::String(_) => 3,
        }
    }
}
