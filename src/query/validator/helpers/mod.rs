//! 验证器共用的检查

pub mod sharding_checker;
pub mod table_checker;

pub use sharding_checker::{is_same_sharding_condition, validate_multiple_table, where_value_of};
pub use table_checker::{validate_table_exist, validate_table_not_exist};
