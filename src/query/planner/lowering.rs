//! 物理转换
//!
//! 每种逻辑节点一个转换器，结构一一对应：子节点递归转换，语义不变，只换节点类型。
//! 扫描在这里解析路由单元，之后执行器不再查询分片规则；分片值无法路由时转换失败。

use log::debug;

use crate::core::error::DBResult;
use crate::query::planner::plan::{
    AggregateNode, CalcNode, FilterNode, HashAggregateNode, JoinNode, LimitSortNode, LogicalPlan, LogicalScan,
    MergeSortNode, NestedLoopJoinNode, PhysicalMergeSortNode, PhysicalPlan, PhysicalScan, PhysicalSortNode,
    ProjectNode, SortNode,
};
use crate::query::planner::rewrite::RewriteContext;

/// 逻辑计划到物理计划的转换器
#[derive(Debug, Clone, Copy)]
pub struct PhysicalLowering<'c, 'a> {
    ctx: &'c RewriteContext<'a>,
}

impl<'c, 'a> PhysicalLowering<'c, 'a> {
    pub fn new(ctx: &'c RewriteContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn lower(&self, plan: &LogicalPlan) -> DBResult<PhysicalPlan> {
        match plan {
            LogicalPlan::Scan(scan) => Ok(PhysicalPlan::Scan(self.convert_scan(scan)?)),
            LogicalPlan::Filter(filter) => self.convert_filter(filter),
            LogicalPlan::Project(project) => self.convert_project(project),
            LogicalPlan::Aggregate(aggregate) => self.convert_aggregate(aggregate),
            LogicalPlan::Join(join) => self.convert_join(join),
            LogicalPlan::Sort(sort) => self.convert_sort(sort),
            LogicalPlan::MergeSort(merge) => self.convert_merge_sort(merge),
        }
    }

    fn convert_scan(&self, scan: &LogicalScan) -> DBResult<PhysicalScan> {
        Ok(PhysicalScan {
            schema: scan.schema().to_string(),
            tables: scan.tables().to_vec(),
            route_units: self.ctx.route_units(scan)?,
            operators: scan.operators().to_vec(),
        })
    }

    fn convert_filter(&self, filter: &FilterNode) -> DBResult<PhysicalPlan> {
        Ok(PhysicalPlan::Calc(CalcNode {
            input: Box::new(self.lower(&filter.input)?),
            condition: Some(filter.condition.clone()),
            projections: None,
        }))
    }

    /// 投影紧贴过滤时两者合并为一个计算节点
    fn convert_project(&self, project: &ProjectNode) -> DBResult<PhysicalPlan> {
        let (input, condition) = match project.input.as_ref() {
            LogicalPlan::Filter(filter) => (self.lower(&filter.input)?, Some(filter.condition.clone())),
            other => (self.lower(other)?, None),
        };
        Ok(PhysicalPlan::Calc(CalcNode {
            input: Box::new(input),
            condition,
            projections: Some(project.expressions.clone()),
        }))
    }

    fn convert_aggregate(&self, aggregate: &AggregateNode) -> DBResult<PhysicalPlan> {
        Ok(PhysicalPlan::HashAggregate(HashAggregateNode {
            input: Box::new(self.lower(&aggregate.input)?),
            group_keys: aggregate.group_keys.clone(),
            aggregates: aggregate.aggregates.clone(),
        }))
    }

    fn convert_join(&self, join: &JoinNode) -> DBResult<PhysicalPlan> {
        Ok(PhysicalPlan::NestedLoopJoin(NestedLoopJoinNode {
            left: Box::new(self.lower(&join.left)?),
            right: Box::new(self.lower(&join.right)?),
            join_type: join.join_type,
            condition: join.condition.clone(),
        }))
    }

    /// 带 OFFSET/FETCH 的排序转为 LimitSort
    fn convert_sort(&self, sort: &SortNode) -> DBResult<PhysicalPlan> {
        let input = Box::new(self.lower(&sort.input)?);
        if sort.offset.is_none() && sort.fetch.is_none() {
            return Ok(PhysicalPlan::Sort(PhysicalSortNode {
                input,
                collation: sort.collation.clone(),
            }));
        }
        Ok(PhysicalPlan::LimitSort(LimitSortNode {
            input,
            collation: sort.collation.clone(),
            offset: sort.offset.clone(),
            fetch: sort.fetch.clone(),
        }))
    }

    /// 扫描输入按路由单元展开，每个分片一路有序输入
    fn convert_merge_sort(&self, merge: &MergeSortNode) -> DBResult<PhysicalPlan> {
        let inputs = match merge.input.as_ref() {
            LogicalPlan::Scan(scan) => {
                let physical = self.convert_scan(scan)?;
                debug!("归并排序展开为 {} 路分片输入", physical.route_units.len());
                physical
                    .route_units
                    .iter()
                    .map(|unit| {
                        PhysicalPlan::Scan(PhysicalScan {
                            route_units: vec![unit.clone()],
                            ..physical.clone()
                        })
                    })
                    .collect()
            }
            other => vec![self.lower(other)?],
        };
        Ok(PhysicalPlan::MergeSort(PhysicalMergeSortNode {
            inputs,
            collation: merge.collation.clone(),
            offset: merge.offset.clone(),
            fetch: merge.fetch.clone(),
        }))
    }
}
