//! 绑定后的语句模型
//!
//! 解析与元数据绑定由外部完成，这里只保存校验和规划需要的结构。

pub mod ddl;
pub mod dml;
pub mod select;
pub mod table;

pub use ddl::{CreateRoutineStatement, CreateTableStatement, CreateViewStatement, RoutineKind};
pub use dml::{Assignment, DeleteStatement, InsertStatement, UpdateStatement};
pub use select::{LimitClause, SelectStatement};
pub use table::TableRef;

use crate::sharding::HintValues;

/// 语句类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    CreateView,
    CreateFunction,
    CreateProcedure,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementType::Select => "SELECT",
            StatementType::Insert => "INSERT",
            StatementType::Update => "UPDATE",
            StatementType::Delete => "DELETE",
            StatementType::CreateTable => "CREATE_TABLE",
            StatementType::CreateView => "CREATE_VIEW",
            StatementType::CreateFunction => "CREATE_FUNCTION",
            StatementType::CreateProcedure => "CREATE_PROCEDURE",
        }
    }
}

/// 语句
#[derive(Debug, Clone, PartialEq)]
pub enum SqlStatement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    CreateTable(CreateTableStatement),
    CreateView(CreateViewStatement),
    CreateRoutine(CreateRoutineStatement),
}

impl SqlStatement {
    pub fn statement_type(&self) -> StatementType {
        match self {
            SqlStatement::Select(_) => StatementType::Select,
            SqlStatement::Insert(_) => StatementType::Insert,
            SqlStatement::Update(_) => StatementType::Update,
            SqlStatement::Delete(_) => StatementType::Delete,
            SqlStatement::CreateTable(_) => StatementType::CreateTable,
            SqlStatement::CreateView(_) => StatementType::CreateView,
            SqlStatement::CreateRoutine(routine) => match routine.kind {
                RoutineKind::Function => StatementType::CreateFunction,
                RoutineKind::Procedure => StatementType::CreateProcedure,
            },
        }
    }

    /// 语句涉及的全部逻辑表名（去重）
    pub fn table_names(&self) -> Vec<String> {
        match self {
            SqlStatement::Select(select) => select.all_table_names(),
            SqlStatement::Insert(insert) => insert.all_table_names(),
            SqlStatement::Update(update) => update.table_names(),
            SqlStatement::Delete(delete) => delete.table_names(),
            SqlStatement::CreateTable(create) => {
                let mut refs = vec![&create.table];
                refs.extend(create.like_table.as_ref());
                table::distinct_table_names(refs)
            }
            SqlStatement::CreateView(view) => {
                let mut names = vec![view.view.name.clone()];
                for name in view.select.all_table_names() {
                    if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                        names.push(name);
                    }
                }
                names
            }
            SqlStatement::CreateRoutine(routine) => table::distinct_table_names(
                routine.referenced_tables.iter().chain(&routine.created_tables),
            ),
        }
    }

    /// LIMIT 子句（仅 UPDATE / DELETE / SELECT）
    pub fn limit(&self) -> Option<&LimitClause> {
        match self {
            SqlStatement::Select(select) => select.limit.as_ref(),
            SqlStatement::Update(update) => update.limit.as_ref(),
            SqlStatement::Delete(delete) => delete.limit.as_ref(),
            _ => None,
        }
    }
}

/// 语句上下文：语句本身与外部提供的 Hint 值
#[derive(Debug, Clone, PartialEq)]
pub struct StatementContext {
    pub statement: SqlStatement,
    pub hint: HintValues,
}

impl StatementContext {
    pub fn new(statement: SqlStatement) -> Self {
        Self {
            statement,
            hint: HintValues::default(),
        }
    }

    pub fn with_hint(mut self, hint: HintValues) -> Self {
        self.hint = hint;
        self
    }

    pub fn statement_type(&self) -> StatementType {
        self.statement.statement_type()
    }
}
