//! 物理计划
//!
//! 交给执行器的节点。每个节点携带执行所需的全部信息，执行期不再查询分片规则。
//! 计划可序列化为 JSON 用于 EXPLAIN。

use serde::Serialize;

use super::collation::Collation;
use super::row_bound::RowBound;
use super::scan::{AggregateCall, DeferredOperator, JoinType};
use crate::core::error::DBResult;
use crate::core::types::Expression;
use crate::query::statement::TableRef;
use crate::sharding::RouteUnit;

/// 分片扫描：路由单元与分片本地执行的算子程序
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalScan {
    pub schema: String,
    pub tables: Vec<TableRef>,
    pub route_units: Vec<RouteUnit>,
    pub operators: Vec<DeferredOperator>,
}

impl PhysicalScan {
    /// 最后一个下推的排序
    pub fn pushed_sort(&self) -> Option<(&Collation, Option<&RowBound>)> {
        self.operators.iter().rev().find_map(|op| match op {
            DeferredOperator::Sort { collation, fetch, .. } => Some((collation, fetch.as_ref())),
            _ => None,
        })
    }
}

/// 过滤与投影合并后的计算节点
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalcNode {
    pub input: Box<PhysicalPlan>,
    pub condition: Option<Expression>,
    pub projections: Option<Vec<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashAggregateNode {
    pub input: Box<PhysicalPlan>,
    pub group_keys: Vec<usize>,
    pub aggregates: Vec<AggregateCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalSortNode {
    pub input: Box<PhysicalPlan>,
    pub collation: Collation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitSortNode {
    pub input: Box<PhysicalPlan>,
    pub collation: Collation,
    pub offset: Option<RowBound>,
    pub fetch: Option<RowBound>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicalMergeSortNode {
    /// 每个路由单元一路输入
    pub inputs: Vec<PhysicalPlan>,
    pub collation: Collation,
    pub offset: Option<RowBound>,
    pub fetch: Option<RowBound>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedLoopJoinNode {
    pub left: Box<PhysicalPlan>,
    pub right: Box<PhysicalPlan>,
    pub join_type: JoinType,
    pub condition: Expression,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum PhysicalPlan {
    Scan(PhysicalScan),
    Calc(CalcNode),
    HashAggregate(HashAggregateNode),
    Sort(PhysicalSortNode),
    LimitSort(LimitSortNode),
    MergeSort(PhysicalMergeSortNode),
    NestedLoopJoin(NestedLoopJoinNode),
}

impl PhysicalPlan {
    pub fn name(&self) -> &'static str {
        match self {
            PhysicalPlan::Scan(_) => "Scan",
            PhysicalPlan::Calc(_) => "Calc",
            PhysicalPlan::HashAggregate(_) => "HashAggregate",
            PhysicalPlan::Sort(_) => "Sort",
            PhysicalPlan::LimitSort(_) => "LimitSort",
            PhysicalPlan::MergeSort(_) => "MergeSort",
            PhysicalPlan::NestedLoopJoin(_) => "NestedLoopJoin",
        }
    }

    pub fn inputs(&self) -> Vec<&PhysicalPlan> {
        match self {
            PhysicalPlan::Scan(_) => Vec::new(),
            PhysicalPlan::Calc(n) => vec![n.input.as_ref()],
            PhysicalPlan::HashAggregate(n) => vec![n.input.as_ref()],
            PhysicalPlan::Sort(n) => vec![n.input.as_ref()],
            PhysicalPlan::LimitSort(n) => vec![n.input.as_ref()],
            PhysicalPlan::MergeSort(n) => n.inputs.iter().collect(),
            PhysicalPlan::NestedLoopJoin(n) => vec![n.left.as_ref(), n.right.as_ref()],
        }
    }

    /// 按名称统计节点数量
    pub fn count(&self, name: &str) -> usize {
        let own = usize::from(self.name() == name);
        own + self.inputs().iter().map(|input| input.count(name)).sum::<usize>()
    }

    /// 前序遍历收集全部分片扫描
    pub fn scans(&self) -> Vec<&PhysicalScan> {
        let mut result = Vec::new();
        self.collect_scans(&mut result);
        result
    }

    fn collect_scans<'a>(&'a self, out: &mut Vec<&'a PhysicalScan>) {
        if let PhysicalPlan::Scan(scan) = self {
            out.push(scan);
        }
        for input in self.inputs() {
            input.collect_scans(out);
        }
    }

    pub fn to_json(&self) -> DBResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
