//! SELECT 语句

use serde::{Deserialize, Serialize};

use super::table::{distinct_table_names, TableRef};
use crate::core::types::Expression;

/// LIMIT 子句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitClause {
    pub offset: Option<Expression>,
    pub row_count: Option<Expression>,
}

impl LimitClause {
    pub fn row_count(row_count: Expression) -> Self {
        Self {
            offset: None,
            row_count: Some(row_count),
        }
    }
}

/// 绑定后的 SELECT 语句
///
/// `tables` 包含 FROM 与 JOIN 中出现的全部表；
/// `subqueries` 为 WHERE 或投影中嵌套的子查询。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectStatement {
    pub tables: Vec<TableRef>,
    pub projections: Vec<Expression>,
    pub where_clause: Option<Expression>,
    pub subqueries: Vec<SelectStatement>,
    pub limit: Option<LimitClause>,
}

impl SelectStatement {
    pub fn new(tables: Vec<TableRef>) -> Self {
        Self {
            tables,
            ..Default::default()
        }
    }

    pub fn from_table(name: &str) -> Self {
        Self::new(vec![TableRef::new(name)])
    }

    pub fn with_projection(mut self, expr: Expression) -> Self {
        self.projections.push(expr);
        self
    }

    pub fn with_where(mut self, predicate: Expression) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    pub fn with_subquery(mut self, subquery: SelectStatement) -> Self {
        self.subqueries.push(subquery);
        self
    }

    pub fn with_limit(mut self, limit: LimitClause) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn contains_subquery(&self) -> bool {
        !self.subqueries.is_empty()
    }

    /// 外层及全部子查询中的表引用
    pub fn all_table_refs(&self) -> Vec<&TableRef> {
        let mut result: Vec<&TableRef> = self.tables.iter().collect();
        for subquery in &self.subqueries {
            result.extend(subquery.all_table_refs());
        }
        result
    }

    /// 外层及全部子查询中的表名（去重）
    pub fn all_table_names(&self) -> Vec<String> {
        distinct_table_names(self.all_table_refs())
    }

    /// 外层 FROM 中的表名（去重）
    pub fn table_names(&self) -> Vec<String> {
        distinct_table_names(&self.tables)
    }

    /// 把列限定符解析为逻辑表名
    pub fn resolve_qualifier(&self, qualifier: &str) -> Option<&str> {
        self.tables
            .iter()
            .find(|t| t.matches_qualifier(qualifier))
            .map(|t| t.name.as_str())
    }
}
