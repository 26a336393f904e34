//! DML 与查询语句验证器

pub mod delete_validator;
pub mod insert_validator;
pub mod select_validator;
pub mod update_validator;

pub use delete_validator::DeleteValidator;
pub use insert_validator::InsertValidator;
pub use select_validator::SelectValidator;
pub use update_validator::UpdateValidator;
