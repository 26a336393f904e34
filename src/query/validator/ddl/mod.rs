//! DDL 语句验证器

pub mod create_routine_validator;
pub mod create_table_validator;
pub mod create_view_validator;

pub use create_routine_validator::CreateRoutineValidator;
pub use create_table_validator::CreateTableValidator;
pub use create_view_validator::CreateViewValidator;
