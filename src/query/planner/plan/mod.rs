//! 计划节点定义
//!
//! 逻辑计划、逻辑扫描与物理计划

pub mod collation;
pub mod logical;
pub mod physical;
pub mod row_bound;
pub mod scan;

pub use collation::{Collation, FieldCollation, NullDirection, SortDirection};
pub use logical::{
    AggregateNode, FilterNode, JoinNode, LogicalPlan, MergeSortNode, PlanKind, ProjectNode, SortNode,
};
pub use physical::{
    CalcNode, HashAggregateNode, LimitSortNode, NestedLoopJoinNode, PhysicalMergeSortNode, PhysicalPlan,
    PhysicalScan, PhysicalSortNode,
};
pub use row_bound::RowBound;
pub use scan::{AggregateCall, DeferredOperator, JoinType, LogicalScan};
