//! INSERT / UPDATE / DELETE 语句

use serde::{Deserialize, Serialize};

use super::select::{LimitClause, SelectStatement};
use super::table::{distinct_table_names, TableRef};
use crate::core::types::{ColumnRef, Expression};

/// `column = value` 赋值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub column: ColumnRef,
    pub value: Expression,
}

impl Assignment {
    pub fn new(column: impl Into<String>, value: Expression) -> Self {
        Self {
            column: ColumnRef::new(None, column),
            value,
        }
    }
}

/// INSERT 语句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    pub table: TableRef,
    /// 显式列清单；为空表示全部列
    pub columns: Vec<String>,
    pub values: Vec<Vec<Expression>>,
    /// INSERT ... SELECT 的来源
    pub select: Option<Box<SelectStatement>>,
    pub on_duplicate_key_update: Vec<Assignment>,
}

impl InsertStatement {
    pub fn new(table: &str, columns: &[&str]) -> Self {
        Self {
            table: TableRef::new(table),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: Vec::new(),
            select: None,
            on_duplicate_key_update: Vec::new(),
        }
    }

    pub fn with_values(mut self, row: Vec<Expression>) -> Self {
        self.values.push(row);
        self
    }

    pub fn with_select(mut self, select: SelectStatement) -> Self {
        self.select = Some(Box::new(select));
        self
    }

    pub fn with_on_duplicate_key_update(mut self, assignment: Assignment) -> Self {
        self.on_duplicate_key_update.push(assignment);
        self
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    /// 目标表与 SELECT 来源中的全部表名
    pub fn all_table_names(&self) -> Vec<String> {
        let mut refs = vec![&self.table];
        if let Some(select) = &self.select {
            refs.extend(select.all_table_refs());
        }
        distinct_table_names(refs)
    }
}

/// UPDATE 语句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    pub tables: Vec<TableRef>,
    pub assignments: Vec<Assignment>,
    pub where_clause: Option<Expression>,
    pub limit: Option<LimitClause>,
}

impl UpdateStatement {
    pub fn new(table: &str) -> Self {
        Self {
            tables: vec![TableRef::new(table)],
            assignments: Vec::new(),
            where_clause: None,
            limit: None,
        }
    }

    pub fn with_assignment(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn with_where(mut self, predicate: Expression) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    pub fn with_limit(mut self, limit: LimitClause) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table_names(&self) -> Vec<String> {
        distinct_table_names(&self.tables)
    }
}

/// DELETE 语句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    pub tables: Vec<TableRef>,
    pub where_clause: Option<Expression>,
    pub limit: Option<LimitClause>,
}

impl DeleteStatement {
    pub fn new(table: &str) -> Self {
        Self {
            tables: vec![TableRef::new(table)],
            where_clause: None,
            limit: None,
        }
    }

    pub fn with_where(mut self, predicate: Expression) -> Self {
        self.where_clause = Some(predicate);
        self
    }

    pub fn with_limit(mut self, limit: LimitClause) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table_names(&self) -> Vec<String> {
        distinct_table_names(&self.tables)
    }
}
