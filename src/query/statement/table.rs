//! 表引用

use serde::{Deserialize, Serialize};
use std::fmt;

/// 绑定后的逻辑表引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    /// 所属逻辑库；为空表示当前库
    pub schema: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// 列限定符是否指向该表（表名或别名）
    pub fn matches_qualifier(&self, qualifier: &str) -> bool {
        self.name.eq_ignore_ascii_case(qualifier)
            || self
                .alias
                .as_deref()
                .is_some_and(|alias| alias.eq_ignore_ascii_case(qualifier))
    }

    /// 是否属于给定逻辑库
    pub fn in_schema(&self, default_schema: &str, schema: &str) -> bool {
        self.schema
            .as_deref()
            .unwrap_or(default_schema)
            .eq_ignore_ascii_case(schema)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

/// 表名去重（不区分大小写，保持顺序）
pub fn distinct_table_names<'a, I>(tables: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a TableRef>,
{
    let mut result: Vec<String> = Vec::new();
    for table in tables {
        if !result.iter().any(|name| name.eq_ignore_ascii_case(&table.name)) {
            result.push(table.name.clone());
        }
    }
    result
}
