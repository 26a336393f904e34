//! 查询管道管理器
//!
//! 协调单条语句的处理流程：路由前检查 → 提取分片条件 → 路由 → 路由后检查
//! → 下推改写 → 物理转换。任一检查失败都在分片 I/O 之前同步返回。
//!
//! 语句级条件只决定语句的路由结果；改写与物理转换中每个扫描按它自己下推的谓词路由，
//! 子查询中的扫描不会继承外层 WHERE 的分片值。

use std::borrow::Cow;

use log::{debug, info};

use crate::config::PlannerConfig;
use crate::core::error::DBResult;
use crate::core::Value;
use crate::query::planner::{LogicalPlan, PhysicalLowering, PhysicalPlan, PlanRewriter, RewriteContext};
use crate::query::statement::{SelectStatement, SqlStatement, StatementContext};
use crate::query::validator::ValidationEngine;
use crate::sharding::{RouteContext, SchemaMetadata, ShardingConditions, ShardingRouter, ShardingRule};

/// 规划结果
#[derive(Debug, Clone)]
pub struct PlannedStatement {
    pub route_context: RouteContext,
    /// 改写后的逻辑计划
    pub logical: LogicalPlan,
    pub physical: PhysicalPlan,
    pub applied_rules: Vec<&'static str>,
}

impl PlannedStatement {
    /// EXPLAIN 输出
    pub fn explain(&self) -> DBResult<String> {
        self.physical.to_json()
    }
}

/// 查询管道管理器
///
/// 分片规则与元数据在规划期间只读，管理器本身不保存语句级状态。
pub struct QueryPipelineManager<'a> {
    rule: &'a ShardingRule,
    metadata: &'a dyn SchemaMetadata,
    validation: ValidationEngine,
    rewriter: PlanRewriter,
}

impl<'a> QueryPipelineManager<'a> {
    pub fn new(rule: &'a ShardingRule, metadata: &'a dyn SchemaMetadata, config: &PlannerConfig) -> Self {
        Self {
            rule,
            metadata,
            validation: ValidationEngine::default(),
            rewriter: PlanRewriter::from_config(config),
        }
    }

    /// 替换验证引擎（例如使用自定义的分片条件引擎）
    pub fn with_validation_engine(mut self, validation: ValidationEngine) -> Self {
        self.validation = validation;
        self
    }

    pub fn validation_engine(&self) -> &ValidationEngine {
        &self.validation
    }

    /// 校验并路由语句
    pub fn route(&self, context: &StatementContext, parameters: &[Value]) -> DBResult<RouteContext> {
        // 1. 路由前检查
        self.validation
            .pre_validate(self.rule, context, parameters, self.metadata)?;

        // 2. 提取分片条件并路由
        let conditions = self.extract_conditions(&context.statement, parameters);
        let tables = context.statement.table_names();
        let route_units = ShardingRouter::new(self.rule, &context.hint).route(&tables, &conditions)?;
        let route_context = RouteContext::new(route_units, parameters.to_vec());
        debug!(
            "{} 路由到 {} 个单元",
            context.statement_type().as_str(),
            route_context.route_unit_count()
        );

        // 3. 路由后检查
        self.validation.post_validate(&context.statement, &route_context)?;
        Ok(route_context)
    }

    /// 校验、路由并生成物理计划
    pub fn plan(
        &self,
        context: &StatementContext,
        logical: LogicalPlan,
        parameters: &[Value],
    ) -> DBResult<PlannedStatement> {
        let route_context = self.route(context, parameters)?;

        let mut rewrite_ctx = RewriteContext::new(
            self.rule,
            self.metadata.schema_name(),
            parameters,
            self.validation.condition_engine().as_ref(),
            &context.hint,
        );
        let rewritten = self.rewriter.rewrite(&mut rewrite_ctx, logical);
        let physical = PhysicalLowering::new(&rewrite_ctx).lower(&rewritten)?;
        info!(
            "规划完成: 应用规则 {:?}，物理扫描 {} 个",
            rewrite_ctx.applied_rules(),
            physical.scans().len()
        );

        Ok(PlannedStatement {
            route_context,
            logical: rewritten,
            physical,
            applied_rules: rewrite_ctx.applied_rules().to_vec(),
        })
    }

    /// 把 DML 语句视为查询提取分片条件；INSERT 与 DDL 没有条件，路由到全部节点
    fn extract_conditions(&self, statement: &SqlStatement, parameters: &[Value]) -> ShardingConditions {
        let view: Option<Cow<'_, SelectStatement>> = match statement {
            SqlStatement::Select(select) => Some(Cow::Borrowed(select)),
            SqlStatement::Update(update) => Some(Cow::Owned(SelectStatement {
                tables: update.tables.clone(),
                where_clause: update.where_clause.clone(),
                ..SelectStatement::default()
            })),
            SqlStatement::Delete(delete) => Some(Cow::Owned(SelectStatement {
                tables: delete.tables.clone(),
                where_clause: delete.where_clause.clone(),
                ..SelectStatement::default()
            })),
            _ => None,
        };
        view.map(|select| {
            self.validation
                .condition_engine()
                .create_sharding_conditions(self.rule, &select, parameters)
        })
        .unwrap_or_default()
    }
}
