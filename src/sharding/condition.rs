//! 分片条件
//!
//! 从 WHERE 子句（外层及每个子查询）中提取分片列上的等值与 IN 谓词。
//! 每个顶层 OR 分支对应一个 [`ShardingCondition`]。

use std::fmt;

use super::ShardingRule;
use crate::core::types::{BinaryOperator, ColumnRef, Expression};
use crate::core::Value;
use crate::query::statement::SelectStatement;

/// 某个分支中一张逻辑表的一个分片列上的取值
#[derive(Debug, Clone, PartialEq)]
pub struct ShardingConditionValue {
    pub table_name: String,
    pub column_name: String,
    pub values: Vec<Value>,
    /// 取值来自的参数标记位置
    pub parameter_marker_indexes: Vec<usize>,
}

/// 一个谓词分支
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardingCondition {
    pub values: Vec<ShardingConditionValue>,
}

impl ShardingCondition {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 查找某表某列的取值
    pub fn values_for(&self, table: &str, column: &str) -> Option<&[Value]> {
        self.values
            .iter()
            .find(|v| v.table_name.eq_ignore_ascii_case(table) && v.column_name.eq_ignore_ascii_case(column))
            .map(|v| v.values.as_slice())
    }

    /// 同一列上重复出现的谓词取交集
    pub fn add(&mut self, value: ShardingConditionValue) {
        let existing = self.values.iter_mut().find(|v| {
            v.table_name.eq_ignore_ascii_case(&value.table_name)
                && v.column_name.eq_ignore_ascii_case(&value.column_name)
        });
        match existing {
            Some(existing) => {
                existing
                    .values
                    .retain(|v| value.values.iter().any(|n| n.sql_equals(v)));
                existing.parameter_marker_indexes.extend(value.parameter_marker_indexes);
            }
            None => self.values.push(value),
        }
    }

    fn retain_tables<S: AsRef<str>>(&self, tables: &[S]) -> ShardingCondition {
        ShardingCondition {
            values: self
                .values
                .iter()
                .filter(|v| tables.iter().any(|t| t.as_ref().eq_ignore_ascii_case(&v.table_name)))
                .cloned()
                .collect(),
        }
    }
}

/// 语句级分片条件（全部分支）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardingConditions {
    conditions: Vec<ShardingCondition>,
}

impl ShardingConditions {
    pub fn new(conditions: Vec<ShardingCondition>) -> Self {
        Self { conditions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn conditions(&self) -> &[ShardingCondition] {
        &self.conditions
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShardingCondition> {
        self.conditions.iter()
    }

    /// 至少提取到一个分片值的分支
    pub fn non_empty_branches(&self) -> Vec<&ShardingCondition> {
        self.conditions.iter().filter(|c| !c.is_empty()).collect()
    }

    /// 任一分支没有提取到分片值
    ///
    /// 这样的分支可以命中任意分片，整组条件因此不能约束路由。
    pub fn has_unconstrained_branch(&self) -> bool {
        self.conditions.iter().any(ShardingCondition::is_empty)
    }

    /// 两组条件的合取：分支两两合并，同一列上的取值取交集
    ///
    /// 没有任何分支的一组条件不施加约束。
    pub fn and(&self, other: &ShardingConditions) -> ShardingConditions {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut conditions = Vec::with_capacity(self.len() * other.len());
        for left in &self.conditions {
            for right in &other.conditions {
                let mut merged = left.clone();
                for value in &right.values {
                    merged.add(value.clone());
                }
                conditions.push(merged);
            }
        }
        ShardingConditions { conditions }
    }

    /// 只保留给定表上的取值，分支结构不变
    pub fn restrict_to<S: AsRef<str>>(&self, tables: &[S]) -> ShardingConditions {
        ShardingConditions {
            conditions: self.conditions.iter().map(|c| c.retain_tables(tables)).collect(),
        }
    }
}

/// 分片条件引擎
pub trait ShardingConditionEngine: fmt::Debug + Send + Sync {
    fn create_sharding_conditions(
        &self,
        rule: &ShardingRule,
        statement: &SelectStatement,
        parameters: &[Value],
    ) -> ShardingConditions;
}

/// 基于 WHERE 子句的默认条件引擎
#[derive(Debug, Default, Clone, Copy)]
pub struct WhereClauseConditionEngine;

impl ShardingConditionEngine for WhereClauseConditionEngine {
    fn create_sharding_conditions(
        &self,
        rule: &ShardingRule,
        statement: &SelectStatement,
        parameters: &[Value],
    ) -> ShardingConditions {
        let mut conditions = Vec::new();
        self.collect(rule, statement, parameters, &mut conditions);
        ShardingConditions::new(conditions)
    }
}

impl WhereClauseConditionEngine {
    fn collect(
        &self,
        rule: &ShardingRule,
        statement: &SelectStatement,
        parameters: &[Value],
        out: &mut Vec<ShardingCondition>,
    ) {
        if let Some(predicate) = &statement.where_clause {
            for branch in predicate.split_disjunction() {
                out.push(self.create_condition(rule, statement, branch, parameters));
            }
        }
        for subquery in &statement.subqueries {
            self.collect(rule, subquery, parameters, out);
        }
    }

    fn create_condition(
        &self,
        rule: &ShardingRule,
        statement: &SelectStatement,
        branch: &Expression,
        parameters: &[Value],
    ) -> ShardingCondition {
        let mut condition = ShardingCondition::default();
        for predicate in branch.split_conjunction() {
            let Some((column, values, markers)) = extract_values(predicate, parameters) else {
                continue;
            };
            let Some(table) = resolve_table(rule, statement, column) else {
                continue;
            };
            let Some(sharding_column) = rule.find_sharding_column(&column.name, &table) else {
                continue;
            };
            condition.add(ShardingConditionValue {
                column_name: sharding_column.to_string(),
                table_name: table,
                values,
                parameter_marker_indexes: markers,
            });
        }
        condition
    }
}

/// `col = v`、`v = col`、`col IN (..)`
fn extract_values<'a>(
    predicate: &'a Expression,
    parameters: &[Value],
) -> Option<(&'a ColumnRef, Vec<Value>, Vec<usize>)> {
    match predicate {
        Expression::Binary {
            op: BinaryOperator::Equal,
            left,
            right,
        } => {
            let (column, other) = match (left.as_ref(), right.as_ref()) {
                (Expression::Column(_), Expression::Column(_)) => return None,
                (Expression::Column(column), other) | (other, Expression::Column(column)) => (column, other),
                _ => return None,
            };
            let value = other.resolve_value(parameters)?;
            Some((column, vec![value], parameter_index(other).into_iter().collect()))
        }
        Expression::InList {
            expr,
            list,
            negated: false,
        } => {
            let Expression::Column(column) = expr.as_ref() else {
                return None;
            };
            let values = list
                .iter()
                .map(|item| item.resolve_value(parameters))
                .collect::<Option<Vec<_>>>()?;
            if values.is_empty() {
                return None;
            }
            Some((column, values, list.iter().filter_map(parameter_index).collect()))
        }
        _ => None,
    }
}

fn parameter_index(expr: &Expression) -> Option<usize> {
    match expr {
        Expression::Parameter(index) => Some(*index),
        _ => None,
    }
}

/// 未限定的列只在恰好一张表以它为分片列时才归属该表
fn resolve_table(rule: &ShardingRule, statement: &SelectStatement, column: &ColumnRef) -> Option<String> {
    match &column.table {
        Some(qualifier) => statement.resolve_qualifier(qualifier).map(str::to_string),
        None => {
            let mut candidates = statement
                .table_names()
                .into_iter()
                .filter(|table| rule.is_sharding_column(&column.name, table));
            let first = candidates.next()?;
            match candidates.next() {
                Some(_) => None,
                None => Some(first),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::statement::TableRef;
    use crate::sharding::{ShardingAlgorithm, ShardingRuleConfiguration, ShardingStrategy, TableRuleConfiguration};

    fn rule() -> ShardingRule {
        let strategy = |column: &str| ShardingStrategy::Standard {
            sharding_column: column.into(),
            algorithm: ShardingAlgorithm::Modulo { sharding_count: 2 },
        };
        let table = |name: &str| TableRuleConfiguration {
            logic_table: name.into(),
            actual_data_nodes: vec![format!("ds_0.{}_0", name), format!("ds_1.{}_1", name)],
            database_strategy: strategy("user_id"),
            table_strategy: ShardingStrategy::None,
            key_generate_column: None,
        };
        ShardingRule::new(ShardingRuleConfiguration {
            tables: vec![table("t_order"), table("t_order_item")],
            ..Default::default()
        })
        .expect("规则应有效")
    }

    fn user_id_eq(value: Expression) -> Expression {
        Expression::equals(Expression::column("user_id"), value)
    }

    #[test]
    fn test_or_branches() {
        let statement = SelectStatement::from_table("t_order").with_where(Expression::or(
            user_id_eq(Expression::literal(1)),
            user_id_eq(Expression::parameter(0)),
        ));
        let conditions = WhereClauseConditionEngine.create_sharding_conditions(&rule(), &statement, &[Value::BigInt(2)]);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions.conditions()[0].values_for("t_order", "user_id"), Some(&[Value::Int(1)][..]));
        let second = &conditions.conditions()[1].values[0];
        assert_eq!(second.values, vec![Value::BigInt(2)]);
        assert_eq!(second.parameter_marker_indexes, vec![0]);
    }

    #[test]
    fn test_reversed_equality_and_in_list() {
        let statement = SelectStatement::from_table("t_order").with_where(Expression::and(
            Expression::equals(Expression::literal(1), Expression::column("USER_ID")),
            Expression::in_list(
                Expression::column("user_id"),
                vec![Expression::literal(1), Expression::literal(3)],
            ),
        ));
        let conditions = WhereClauseConditionEngine.create_sharding_conditions(&rule(), &statement, &[]);
        assert_eq!(conditions.conditions()[0].values_for("t_order", "user_id"), Some(&[Value::Int(1)][..]));
    }

    #[test]
    fn test_ambiguous_unqualified_column_is_ignored() {
        let statement = SelectStatement::new(vec![TableRef::new("t_order"), TableRef::new("t_order_item")])
            .with_where(user_id_eq(Expression::literal(1)));
        let conditions = WhereClauseConditionEngine.create_sharding_conditions(&rule(), &statement, &[]);
        assert!(conditions.non_empty_branches().is_empty());
    }

    #[test]
    fn test_subquery_conditions_and_restrict() {
        let statement = SelectStatement::new(vec![TableRef::new("t_order").with_alias("o")])
            .with_where(Expression::equals(
                Expression::qualified_column("o", "user_id"),
                Expression::literal(1),
            ))
            .with_subquery(SelectStatement::from_table("t_order_item").with_where(user_id_eq(Expression::literal(1))));
        let conditions = WhereClauseConditionEngine.create_sharding_conditions(&rule(), &statement, &[]);
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions.conditions()[1].values[0].table_name, "t_order_item");

        let restricted = conditions.restrict_to(&["t_order"]);
        assert_eq!(restricted.len(), 2);
        assert!(restricted.conditions()[1].is_empty());
    }

    #[test]
    fn test_and_combines_branches() {
        let engine = WhereClauseConditionEngine;
        let rule = rule();
        let either = engine.create_sharding_conditions(
            &rule,
            &SelectStatement::from_table("t_order").with_where(Expression::or(
                user_id_eq(Expression::literal(1)),
                user_id_eq(Expression::literal(3)),
            )),
            &[],
        );
        let one = engine.create_sharding_conditions(
            &rule,
            &SelectStatement::from_table("t_order").with_where(user_id_eq(Expression::literal(1))),
            &[],
        );

        let combined = either.and(&one);
        assert_eq!(combined.len(), 2);
        assert_eq!(combined.conditions()[0].values_for("t_order", "user_id"), Some(&[Value::Int(1)][..]));
        assert!(combined.conditions()[1]
            .values_for("t_order", "user_id")
            .is_some_and(|values| values.is_empty()));
        assert_eq!(ShardingConditions::empty().and(&one), one);
    }

    #[test]
    fn test_branch_without_sharding_value_is_unconstrained() {
        let statement = SelectStatement::from_table("t_order").with_where(Expression::or(
            user_id_eq(Expression::literal(1)),
            Expression::equals(Expression::column("status"), Expression::literal("x")),
        ));
        let conditions = WhereClauseConditionEngine.create_sharding_conditions(&rule(), &statement, &[]);
        assert_eq!(conditions.len(), 2);
        assert!(conditions.has_unconstrained_branch());
    }

    #[test]
    fn test_non_sharding_column_is_ignored() {
        let statement = SelectStatement::from_table("t_order")
            .with_where(Expression::equals(Expression::column("status"), Expression::literal("paid")));
        let conditions = WhereClauseConditionEngine.create_sharding_conditions(&rule(), &statement, &[]);
        assert_eq!(conditions.len(), 1);
        assert!(conditions.conditions()[0].is_empty());
    }
}
