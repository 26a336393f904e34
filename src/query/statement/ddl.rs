//! DDL 语句：建表、建视图、建函数/存储过程

use serde::{Deserialize, Serialize};

use super::select::SelectStatement;
use super::table::TableRef;

/// CREATE TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStatement {
    pub table: TableRef,
    pub if_not_exists: bool,
    /// `CREATE TABLE ... LIKE other`
    pub like_table: Option<TableRef>,
}

impl CreateTableStatement {
    pub fn new(table: &str) -> Self {
        Self {
            table: TableRef::new(table),
            if_not_exists: false,
            like_table: None,
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn like(mut self, table: &str) -> Self {
        self.like_table = Some(TableRef::new(table));
        self
    }
}

/// CREATE VIEW
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateViewStatement {
    pub view: TableRef,
    /// `CREATE OR REPLACE VIEW` 允许视图已存在
    pub or_replace: bool,
    pub select: SelectStatement,
}

impl CreateViewStatement {
    pub fn new(view: &str, select: SelectStatement) -> Self {
        Self {
            view: TableRef::new(view),
            or_replace: false,
            select,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoutineKind {
    Function,
    Procedure,
}

/// CREATE FUNCTION / CREATE PROCEDURE
///
/// 例程体中被读写的表放在 `referenced_tables`，例程体内 CREATE TABLE 的表放在 `created_tables`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRoutineStatement {
    pub kind: RoutineKind,
    pub name: String,
    pub referenced_tables: Vec<TableRef>,
    pub created_tables: Vec<TableRef>,
}

impl CreateRoutineStatement {
    pub fn new(kind: RoutineKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            referenced_tables: Vec::new(),
            created_tables: Vec::new(),
        }
    }

    pub fn references(mut self, table: &str) -> Self {
        self.referenced_tables.push(TableRef::new(table));
        self
    }

    pub fn creates(mut self, table: &str) -> Self {
        self.created_tables.push(TableRef::new(table));
        self
    }
}
