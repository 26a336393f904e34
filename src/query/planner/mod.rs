//! 联邦规划器
//!
//! - `plan`: 逻辑计划、逻辑扫描与物理计划
//! - `rewrite`: 下推规则与不动点重写器
//! - `lowering`: 逻辑计划到物理计划的转换

pub mod lowering;
pub mod plan;
pub mod rewrite;

pub use lowering::PhysicalLowering;
pub use plan::{LogicalPlan, LogicalScan, PhysicalPlan, PlanKind};
pub use rewrite::{PlanRewriter, RewriteContext, RuleRegistry};
