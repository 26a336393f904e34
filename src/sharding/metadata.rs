//! 逻辑库元数据（表是否存在）

use std::collections::BTreeSet;

/// 逻辑库元数据
pub trait SchemaMetadata: Send + Sync {
    fn schema_name(&self) -> &str;

    fn contains_table(&self, table: &str) -> bool;
}

/// 内存元数据
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaMetadata {
    name: String,
    tables: BTreeSet<String>,
}

impl InMemorySchemaMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeSet::new(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.add_table(table);
        self
    }

    pub fn add_table(&mut self, table: &str) {
        self.tables.insert(table.to_ascii_lowercase());
    }

    pub fn remove_table(&mut self, table: &str) -> bool {
        self.tables.remove(&table.to_ascii_lowercase())
    }
}

impl SchemaMetadata for InMemorySchemaMetadata {
    fn schema_name(&self) -> &str {
        &self.name
    }

    fn contains_table(&self, table: &str) -> bool {
        self.tables.contains(&table.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_table_ignores_case() {
        let mut metadata = InMemorySchemaMetadata::new("logic_db").with_table("t_order");
        assert!(metadata.contains_table("T_ORDER"));
        assert!(metadata.remove_table("t_order"));
        assert!(!metadata.contains_table("t_order"));
        assert_eq!(metadata.schema_name(), "logic_db");
    }
}
