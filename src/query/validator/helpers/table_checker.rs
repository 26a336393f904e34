//! 表存在性检查

use crate::core::error::ValidationError;
use crate::query::statement::TableRef;
use crate::sharding::SchemaMetadata;

/// 表必须已存在
pub fn validate_table_exist<'a, I>(metadata: &dyn SchemaMetadata, tables: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a TableRef>,
{
    for table in tables {
        if !metadata.contains_table(&table.name) {
            return Err(ValidationError::table_not_exists(&table.name));
        }
    }
    Ok(())
}

/// 表必须不存在
pub fn validate_table_not_exist<'a, I>(metadata: &dyn SchemaMetadata, tables: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a TableRef>,
{
    for table in tables {
        if metadata.contains_table(&table.name) {
            return Err(ValidationError::table_exists(&table.name));
        }
    }
    Ok(())
}
