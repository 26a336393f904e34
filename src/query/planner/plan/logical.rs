//! 逻辑计划
//!
//! 封闭的节点集合，每个变体携带自身的负载。规则按 [`PlanKind`] 查找。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::collation::Collation;
use super::row_bound::RowBound;
use super::scan::{AggregateCall, JoinType, LogicalScan};
use crate::core::types::Expression;
use crate::query::statement::TableRef;

/// 节点类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanKind {
    Scan,
    Filter,
    Project,
    Aggregate,
    Join,
    Sort,
    MergeSort,
}

impl PlanKind {
    pub fn name(&self) -> &'static str {
        match self {
            PlanKind::Scan => "Scan",
            PlanKind::Filter => "Filter",
            PlanKind::Project => "Project",
            PlanKind::Aggregate => "Aggregate",
            PlanKind::Join => "Join",
            PlanKind::Sort => "Sort",
            PlanKind::MergeSort => "MergeSort",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterNode {
    pub input: Box<LogicalPlan>,
    pub condition: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectNode {
    pub input: Box<LogicalPlan>,
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateNode {
    pub input: Box<LogicalPlan>,
    pub group_keys: Vec<usize>,
    pub aggregates: Vec<AggregateCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinNode {
    pub left: Box<LogicalPlan>,
    pub right: Box<LogicalPlan>,
    pub join_type: JoinType,
    pub condition: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortNode {
    pub input: Box<LogicalPlan>,
    pub collation: Collation,
    pub offset: Option<RowBound>,
    pub fetch: Option<RowBound>,
}

/// 联邦层对已排序分片流的多路归并，归并后再应用 offset/fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSortNode {
    pub input: Box<LogicalPlan>,
    pub collation: Collation,
    pub offset: Option<RowBound>,
    pub fetch: Option<RowBound>,
}

/// 逻辑计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogicalPlan {
    Scan(LogicalScan),
    Filter(FilterNode),
    Project(ProjectNode),
    Aggregate(AggregateNode),
    Join(JoinNode),
    Sort(SortNode),
    MergeSort(MergeSortNode),
}

impl LogicalPlan {
    pub fn scan(schema: &str, table: TableRef) -> Self {
        LogicalPlan::Scan(LogicalScan::new(schema, table))
    }

    pub fn filter(self, condition: Expression) -> Self {
        LogicalPlan::Filter(FilterNode {
            input: Box::new(self),
            condition,
        })
    }

    pub fn project(self, expressions: Vec<Expression>) -> Self {
        LogicalPlan::Project(ProjectNode {
            input: Box::new(self),
            expressions,
        })
    }

    pub fn aggregate(self, group_keys: Vec<usize>, aggregates: Vec<AggregateCall>) -> Self {
        LogicalPlan::Aggregate(AggregateNode {
            input: Box::new(self),
            group_keys,
            aggregates,
        })
    }

    pub fn sort(self, collation: Collation, offset: Option<RowBound>, fetch: Option<RowBound>) -> Self {
        LogicalPlan::Sort(SortNode {
            input: Box::new(self),
            collation,
            offset,
            fetch,
        })
    }

    pub fn join(left: LogicalPlan, right: LogicalPlan, join_type: JoinType, condition: Expression) -> Self {
        LogicalPlan::Join(JoinNode {
            left: Box::new(left),
            right: Box::new(right),
            join_type,
            condition,
        })
    }

    pub fn kind(&self) -> PlanKind {
        match self {
            LogicalPlan::Scan(_) => PlanKind::Scan,
            LogicalPlan::Filter(_) => PlanKind::Filter,
            LogicalPlan::Project(_) => PlanKind::Project,
            LogicalPlan::Aggregate(_) => PlanKind::Aggregate,
            LogicalPlan::Join(_) => PlanKind::Join,
            LogicalPlan::Sort(_) => PlanKind::Sort,
            LogicalPlan::MergeSort(_) => PlanKind::MergeSort,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn as_scan(&self) -> Option<&LogicalScan> {
        match self {
            LogicalPlan::Scan(scan) => Some(scan),
            _ => None,
        }
    }

    pub fn inputs(&self) -> Vec<&LogicalPlan> {
        match self {
            LogicalPlan::Scan(_) => Vec::new(),
            LogicalPlan::Filter(n) => vec![n.input.as_ref()],
            LogicalPlan::Project(n) => vec![n.input.as_ref()],
            LogicalPlan::Aggregate(n) => vec![n.input.as_ref()],
            LogicalPlan::Join(n) => vec![n.left.as_ref(), n.right.as_ref()],
            LogicalPlan::Sort(n) => vec![n.input.as_ref()],
            LogicalPlan::MergeSort(n) => vec![n.input.as_ref()],
        }
    }

    /// 逐个替换子节点；`f` 按 [`inputs`](Self::inputs) 的顺序调用
    pub fn map_inputs<F>(self, mut f: F) -> LogicalPlan
    where
        F: FnMut(LogicalPlan) -> LogicalPlan,
    {
        let mut map = |input: Box<LogicalPlan>| Box::new(f(*input));
        match self {
            LogicalPlan::Scan(scan) => LogicalPlan::Scan(scan),
            LogicalPlan::Filter(n) => LogicalPlan::Filter(FilterNode {
                input: map(n.input),
                condition: n.condition,
            }),
            LogicalPlan::Project(n) => LogicalPlan::Project(ProjectNode {
                input: map(n.input),
                expressions: n.expressions,
            }),
            LogicalPlan::Aggregate(n) => LogicalPlan::Aggregate(AggregateNode {
                input: map(n.input),
                group_keys: n.group_keys,
                aggregates: n.aggregates,
            }),
            LogicalPlan::Join(n) => {
                let left = map(n.left);
                let right = map(n.right);
                LogicalPlan::Join(JoinNode {
                    left,
                    right,
                    join_type: n.join_type,
                    condition: n.condition,
                })
            }
            LogicalPlan::Sort(n) => LogicalPlan::Sort(SortNode {
                input: map(n.input),
                collation: n.collation,
                offset: n.offset,
                fetch: n.fetch,
            }),
            LogicalPlan::MergeSort(n) => LogicalPlan::MergeSort(MergeSortNode {
                input: map(n.input),
                collation: n.collation,
                offset: n.offset,
                fetch: n.fetch,
            }),
        }
    }

    /// 计划树中某类节点的数量
    pub fn count_kind(&self, kind: PlanKind) -> usize {
        let own = usize::from(self.kind() == kind);
        own + self.inputs().iter().map(|input| input.count_kind(kind)).sum::<usize>()
    }

    fn explain(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let line = match self {
            LogicalPlan::Scan(scan) => scan.to_string(),
            LogicalPlan::Filter(n) => format!("Filter({})", n.condition),
            LogicalPlan::Project(n) => {
                let items: Vec<String> = n.expressions.iter().map(|e| e.to_string()).collect();
                format!("Project({})", items.join(", "))
            }
            LogicalPlan::Aggregate(n) => format!("Aggregate(group={:?}, calls={})", n.group_keys, n.aggregates.len()),
            LogicalPlan::Join(n) => format!("Join({}, {})", n.join_type.as_str(), n.condition),
            LogicalPlan::Sort(n) => format!("Sort({}, offset={:?}, fetch={:?})", n.collation, n.offset, n.fetch),
            LogicalPlan::MergeSort(n) => format!("MergeSort({}, offset={:?}, fetch={:?})", n.collation, n.offset, n.fetch),
        };
        out.push_str(&indent);
        out.push_str(&line);
        out.push('\n');
        for input in self.inputs() {
            input.explain(depth + 1, out);
        }
    }
}

impl fmt::Display for LogicalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.explain(0, &mut out);
        write!(f, "{}", out.trim_end())
    }
}
