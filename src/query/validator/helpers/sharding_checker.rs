//! 分片相关的通用检查

use crate::core::error::ValidationError;
use crate::core::types::{BinaryOperator, ColumnRef, Expression};
use crate::core::Value;
use crate::sharding::{ShardingCondition, ShardingConditionValue, ShardingRule};

/// DML 多表检查
///
/// 多张表只在全部为同一绑定组的分片表，或全部不是分片表时允许。
pub fn validate_multiple_table(rule: &ShardingRule, kind: &str, tables: &[String]) -> Result<(), ValidationError> {
    if tables.len() <= 1 {
        return Ok(());
    }
    let all_sharding = rule.sharding_table_names(tables).len() == tables.len() && rule.is_all_binding_tables(tables);
    let none_sharding = !rule.contains_sharding_table(tables);
    if all_sharding || none_sharding {
        Ok(())
    } else {
        Err(ValidationError::unsupported_multi_table(kind, tables))
    }
}

/// 各分支是否命中同一分片
///
/// 按位置比较：同一逻辑表（或互为绑定表）、同名分片列、数值安全相等的取值。
pub fn is_same_sharding_condition(rule: &ShardingRule, branches: &[&ShardingCondition]) -> bool {
    let Some((example, others)) = branches.split_first() else {
        return true;
    };
    others.iter().all(|other| {
        example.values.len() == other.values.len()
            && example
                .values
                .iter()
                .zip(&other.values)
                .all(|(left, right)| is_same_condition_value(rule, left, right))
    })
}

fn is_same_condition_value(rule: &ShardingRule, left: &ShardingConditionValue, right: &ShardingConditionValue) -> bool {
    let same_table = left.table_name.eq_ignore_ascii_case(&right.table_name)
        || rule.is_all_binding_tables(&[left.table_name.as_str(), right.table_name.as_str()]);
    same_table
        && left.column_name.eq_ignore_ascii_case(&right.column_name)
        && left.values.len() == right.values.len()
        && left
            .values
            .iter()
            .zip(&right.values)
            .all(|(a, b)| a.sql_equals(b))
}

/// 在一个合取谓词组中解析某列的等值
///
/// 支持 `col = v`、`v = col` 以及 `col IN (..)`（取第一个可解析的成员）。
pub fn where_value_of(group: &Expression, column: &ColumnRef, table_matches: impl Fn(&str) -> bool, parameters: &[Value]) -> Option<Value> {
    let is_target = |candidate: &ColumnRef| {
        candidate.matches_name(&column.name)
            && candidate.table.as_deref().map_or(true, |qualifier| table_matches(qualifier))
    };
    for predicate in group.split_conjunction() {
        match predicate {
            Expression::Binary {
                op: BinaryOperator::Equal,
                left,
                right,
            } => {
                let other = match (left.as_ref(), right.as_ref()) {
                    (Expression::Column(c), other) if is_target(c) => other,
                    (other, Expression::Column(c)) if is_target(c) => other,
                    _ => continue,
                };
                if let Some(value) = other.resolve_value(parameters) {
                    return Some(value);
                }
            }
            Expression::InList {
                expr,
                list,
                negated: false,
            } => {
                if let Expression::Column(c) = expr.as_ref() {
                    if is_target(c) {
                        if let Some(value) = list.iter().find_map(|item| item.resolve_value(parameters)) {
                            return Some(value);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    None
}
