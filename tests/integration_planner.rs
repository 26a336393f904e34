//! 联邦下推规划集成测试
//!
//! 测试范围:
//! - QueryPipelineManager::plan - 校验、路由、改写与物理转换
//! - 下推规则在标准分片环境下的组合效果
//! - 多路由排序的分片扫描与归并执行

mod common;

use common::assertions::{assert_count, assert_db_validation_error, assert_ok};
use common::{context, metadata, sharding_rule, SCHEMA};
use shardfed::config::PlannerConfig;
use shardfed::core::error::{DBError, ValidationErrorType};
use shardfed::core::types::{AggregateFunction, Expression};
use shardfed::core::Value;
use shardfed::query::executor::{merge_sort, resolve_bounds, Row};
use shardfed::query::planner::plan::{AggregateCall, Collation, DeferredOperator, FieldCollation, JoinType, RowBound};
use shardfed::query::planner::{LogicalPlan, PhysicalPlan};
use shardfed::query::statement::{Assignment, LimitClause, SelectStatement, SqlStatement, TableRef, UpdateStatement};
use shardfed::query::{PlannedStatement, QueryPipelineManager};
use shardfed::sharding::{InMemorySchemaMetadata, ShardingRule, ShardingRuleError};

struct Fixture {
    rule: ShardingRule,
    metadata: InMemorySchemaMetadata,
}

impl Fixture {
    fn new() -> Self {
        Self {
            rule: sharding_rule(),
            metadata: metadata(),
        }
    }

    fn pipeline(&self, config: &PlannerConfig) -> QueryPipelineManager<'_> {
        QueryPipelineManager::new(&self.rule, &self.metadata, config)
    }

    fn plan(&self, select: SelectStatement, logical: LogicalPlan, parameters: &[Value]) -> PlannedStatement {
        let pipeline = self.pipeline(&PlannerConfig::default());
        assert_ok(pipeline.plan(&context(SqlStatement::Select(select)), logical, parameters))
    }
}

fn scan(table: &str) -> LogicalPlan {
    LogicalPlan::scan(SCHEMA, TableRef::new(table))
}

fn by_first_column() -> Collation {
    Collation::new(vec![FieldCollation::asc(0)])
}

fn rows(ids: &[i64]) -> Vec<Row> {
    ids.iter().map(|id| vec![Value::BigInt(*id)]).collect()
}

// ==================== 连接下推 ====================

#[test]
fn test_binding_join_folds_into_single_scan() {
    let fixture = Fixture::new();
    let condition = Expression::equals(
        Expression::qualified_column("t_order", "order_id"),
        Expression::qualified_column("t_order_item", "order_id"),
    );
    let logical = LogicalPlan::join(scan("t_order"), scan("t_order_item"), JoinType::Inner, condition);
    let select = SelectStatement::new(vec![TableRef::new("t_order"), TableRef::new("t_order_item")]);

    let planned = fixture.plan(select, logical, &[]);

    assert_eq!(planned.physical.count("NestedLoopJoin"), 0);
    let scans = planned.physical.scans();
    assert_count(&scans, 1, "分片扫描");
    assert!(matches!(scans[0].operators.as_slice(), [DeferredOperator::Join { .. }]));
    assert!(planned.applied_rules.contains(&"PushJoinIntoScanRule"));
}

#[test]
fn test_join_between_sharded_and_remote_single_table_stays_federated() {
    let fixture = Fixture::new();
    let condition = Expression::equals(
        Expression::qualified_column("t_order", "user_id"),
        Expression::qualified_column("t_user", "user_id"),
    );
    let logical = LogicalPlan::join(scan("t_order"), scan("t_user"), JoinType::Left, condition);
    let select = SelectStatement::new(vec![TableRef::new("t_order"), TableRef::new("t_user")]);

    let planned = fixture.plan(select, logical, &[]);

    assert_eq!(planned.physical.count("NestedLoopJoin"), 1);
    assert_count(&planned.physical.scans(), 2, "分片扫描");
}

#[test]
fn test_join_with_broadcast_table_folds() {
    let fixture = Fixture::new();
    let condition = Expression::equals(
        Expression::qualified_column("t_order", "status"),
        Expression::qualified_column("t_config", "name"),
    );
    let logical = LogicalPlan::join(scan("t_order"), scan("t_config"), JoinType::Inner, condition);
    let select = SelectStatement::new(vec![TableRef::new("t_order"), TableRef::new("t_config")]);

    let planned = fixture.plan(select, logical, &[]);

    assert_eq!(planned.physical.count("NestedLoopJoin"), 0);
    assert_count(&planned.physical.scans(), 1, "分片扫描");
}

// ==================== 排序下推 ====================

#[test]
fn test_order_by_on_full_route_merges_per_shard_scans() {
    let fixture = Fixture::new();
    let logical = scan("t_order").sort(by_first_column(), None, None);

    let planned = fixture.plan(SelectStatement::from_table("t_order"), logical, &[]);

    let PhysicalPlan::MergeSort(merge) = &planned.physical else {
        panic!("期望 MergeSort 根节点, 实际 {}", planned.physical.name());
    };
    assert_count(&merge.inputs, 4, "归并输入");
    assert_eq!(merge.collation, by_first_column());
    assert!(merge.offset.is_none() && merge.fetch.is_none());
    for input in &merge.inputs {
        let PhysicalPlan::Scan(shard) = input else {
            panic!("归并输入应为分片扫描, 实际 {}", input.name());
        };
        assert_count(&shard.route_units, 1, "路由单元");
        let (collation, fetch) = shard.pushed_sort().expect("每个分片都应携带排序");
        assert_eq!(collation, &by_first_column());
        assert!(fetch.is_none());
    }
    assert_eq!(planned.physical.count("Sort"), 0);
}

#[test]
fn test_order_by_on_single_route_needs_no_merge() {
    let fixture = Fixture::new();
    let predicate = Expression::and(
        Expression::equals(Expression::column("user_id"), Expression::literal(1)),
        Expression::equals(Expression::column("order_id"), Expression::literal(1)),
    );
    let logical = scan("t_order")
        .filter(predicate.clone())
        .sort(by_first_column(), None, Some(RowBound::Literal(5)));
    let select = SelectStatement::from_table("t_order").with_where(predicate);

    let planned = fixture.plan(select, logical, &[]);

    assert_eq!(planned.physical.count("MergeSort"), 0);
    let scans = planned.physical.scans();
    assert_count(&scans, 1, "分片扫描");
    assert_eq!(scans[0].route_units[0].find_actual_table("t_order"), Some("t_order_1"));
    assert_eq!(scans[0].pushed_sort().map(|(_, fetch)| fetch.cloned()), Some(Some(RowBound::Literal(5))));
}

#[test]
fn test_limit_offset_pushes_bound_and_merges_globally() {
    let fixture = Fixture::new();
    let predicate = Expression::equals(Expression::column("user_id"), Expression::literal(0));
    let logical = scan("t_order")
        .filter(predicate.clone())
        .sort(by_first_column(), Some(RowBound::Literal(1)), Some(RowBound::Literal(2)));
    let select = SelectStatement::from_table("t_order")
        .with_where(predicate)
        .with_limit(LimitClause::row_count(Expression::literal(2)));

    let planned = fixture.plan(select, logical, &[]);

    let PhysicalPlan::MergeSort(merge) = &planned.physical else {
        panic!("期望 MergeSort 根节点, 实际 {}", planned.physical.name());
    };
    assert_count(&merge.inputs, 2, "归并输入");
    assert_eq!(merge.offset, Some(RowBound::Literal(1)));
    assert_eq!(merge.fetch, Some(RowBound::Literal(2)));
    for shard in planned.physical.scans() {
        assert_eq!(shard.pushed_sort().and_then(|(_, fetch)| fetch.cloned()), Some(RowBound::Literal(3)));
    }

    // 两个分片各自返回本地前 3 行，归并后跳过 1 行取 2 行
    let (offset, fetch) = assert_ok(resolve_bounds(merge.offset.as_ref(), merge.fetch.as_ref(), &[]));
    let merged: Vec<Row> = merge_sort(vec![rows(&[1, 3, 5]), rows(&[2, 4, 6])], &merge.collation, offset, fetch).collect();
    assert_eq!(merged, rows(&[2, 3]));
}

#[test]
fn test_parameterized_limit_is_resolved_at_execution() {
    let fixture = Fixture::new();
    let logical = scan("t_order").sort(
        by_first_column(),
        Some(RowBound::Parameter(0)),
        Some(RowBound::Parameter(1)),
    );
    let parameters = vec![Value::Int(2), Value::Int(3)];

    let planned = fixture.plan(SelectStatement::from_table("t_order"), logical, &parameters);

    let PhysicalPlan::MergeSort(merge) = &planned.physical else {
        panic!("期望 MergeSort 根节点, 实际 {}", planned.physical.name());
    };
    let expected = RowBound::Plus(Box::new(RowBound::Parameter(0)), Box::new(RowBound::Parameter(1)));
    for shard in planned.physical.scans() {
        let bound = shard.pushed_sort().and_then(|(_, fetch)| fetch.cloned());
        assert_eq!(bound.as_ref(), Some(&expected));
        assert_eq!(bound.and_then(|b| b.evaluate(&parameters)), Some(5));
    }
    let (offset, fetch) = assert_ok(resolve_bounds(merge.offset.as_ref(), merge.fetch.as_ref(), &parameters));
    assert_eq!((offset, fetch), (Some(2), Some(3)));
}

// ==================== 聚合下推 ====================

#[test]
fn test_single_value_aggregate_stays_above_scan() {
    let fixture = Fixture::new();
    let logical = scan("t_order").aggregate(
        Vec::new(),
        vec![AggregateCall::new(AggregateFunction::SingleValue, vec![0], "v")],
    );

    let planned = fixture.plan(SelectStatement::from_table("t_order"), logical, &[]);

    assert_eq!(planned.physical.name(), "HashAggregate");
    assert!(planned.physical.scans().iter().all(|scan| !scan
        .operators
        .iter()
        .any(|op| matches!(op, DeferredOperator::Aggregate { .. }))));
}

#[test]
fn test_count_aggregate_is_pushed() {
    let fixture = Fixture::new();
    let logical = scan("t_order")
        .filter(Expression::equals(Expression::column("status"), Expression::literal("PAID")))
        .aggregate(vec![0], vec![AggregateCall::new(AggregateFunction::Count, vec![1], "cnt")]);

    let planned = fixture.plan(SelectStatement::from_table("t_order"), logical, &[]);

    assert_eq!(planned.physical.count("HashAggregate"), 0);
    assert_eq!(planned.physical.count("Calc"), 0);
    let scans = planned.physical.scans();
    assert_count(&scans, 1, "分片扫描");
    let names: Vec<&str> = scans[0].operators.iter().map(|op| op.name()).collect();
    assert_eq!(names, vec!["Filter", "Aggregate"]);
}

// ==================== 扫描路由 ====================

#[test]
fn test_subquery_scan_ignores_outer_sharding_values() {
    let fixture = Fixture::new();
    let predicate = Expression::and(
        Expression::equals(Expression::column("user_id"), Expression::literal(1)),
        Expression::equals(Expression::column("order_id"), Expression::literal(1)),
    );
    let average = scan("t_order").aggregate(Vec::new(), vec![AggregateCall::new(AggregateFunction::Avg, vec![2], "avg")]);
    let logical = LogicalPlan::join(
        scan("t_order").filter(predicate.clone()),
        average,
        JoinType::Inner,
        Expression::literal(true),
    );
    let select = SelectStatement::from_table("t_order")
        .with_where(predicate)
        .with_subquery(SelectStatement::from_table("t_order"));

    let planned = fixture.plan(select, logical, &[]);

    assert_eq!(planned.physical.count("NestedLoopJoin"), 1);
    let scans = planned.physical.scans();
    assert_count(&scans, 2, "分片扫描");
    assert_count(&scans[0].route_units, 1, "外层路由单元");
    assert_eq!(scans[0].route_units[0].find_actual_table("t_order"), Some("t_order_1"));
    assert!(scans[1]
        .operators
        .iter()
        .any(|op| matches!(op, DeferredOperator::Aggregate { .. })));
    assert_count(&scans[1].route_units, 4, "子查询路由单元");
}

#[test]
fn test_numeric_string_sharding_value_routes_like_integer() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(&PlannerConfig::default());
    let select = SelectStatement::from_table("t_order")
        .with_where(Expression::equals(Expression::column("user_id"), Expression::literal("1")));

    let route = assert_ok(pipeline.route(&context(SqlStatement::Select(select)), &[]));

    assert_eq!(route.route_unit_count(), 2);
    assert_eq!(route.data_source_names(), vec!["ds_1"]);
}

#[test]
fn test_unmappable_sharding_value_is_rejected() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(&PlannerConfig::default());
    let select = SelectStatement::from_table("t_order")
        .with_where(Expression::equals(Expression::column("user_id"), Expression::literal("abc")));

    let result = pipeline.route(&context(SqlStatement::Select(select)), &[]);

    assert!(
        matches!(
            result,
            Err(DBError::ShardingRule(ShardingRuleError::UnroutableShardingValue { .. }))
        ),
        "期望分片值无法路由, 实际 {:?}",
        result
    );
}

#[test]
fn test_empty_in_intersection_routes_to_all_shards() {
    let fixture = Fixture::new();
    let pipeline = fixture.pipeline(&PlannerConfig::default());
    let predicate = Expression::and(
        Expression::in_list(
            Expression::column("user_id"),
            vec![Expression::literal(1), Expression::literal(3)],
        ),
        Expression::equals(Expression::column("user_id"), Expression::literal(2)),
    );
    let select = SelectStatement::from_table("t_order").with_where(predicate);

    let route = assert_ok(pipeline.route(&context(SqlStatement::Select(select)), &[]));

    assert_eq!(route.route_unit_count(), 4);
}

// ==================== 配置与输出 ====================

#[test]
fn test_disabled_rules_keep_operators_federated() {
    let fixture = Fixture::new();
    let config = PlannerConfig {
        enable_filter_push_down: false,
        ..PlannerConfig::default()
    };
    let logical = scan("t_order").filter(Expression::equals(Expression::column("status"), Expression::literal("PAID")));
    let statement = SqlStatement::Select(SelectStatement::from_table("t_order"));

    let planned = assert_ok(fixture.pipeline(&config).plan(&context(statement), logical, &[]));

    assert_eq!(planned.physical.name(), "Calc");
    assert!(planned.applied_rules.is_empty());
}

#[test]
fn test_explain_serializes_physical_plan() {
    let fixture = Fixture::new();
    let logical = scan("t_order").sort(by_first_column(), None, Some(RowBound::Literal(10)));

    let planned = fixture.plan(SelectStatement::from_table("t_order"), logical, &[]);
    let json = assert_ok(planned.explain());

    let value: serde_json::Value = assert_ok(serde_json::from_str(&json));
    assert_eq!(value["node"], "merge_sort");
    assert_eq!(value["inputs"].as_array().map(Vec::len), Some(4));
    assert!(json.contains("t_order_0"));
    assert!(planned.applied_rules.contains(&"PushSortIntoMultiRoutingScanRule"));
}

#[test]
fn test_planning_stops_at_validation_failure() {
    let fixture = Fixture::new();
    let statement = SqlStatement::Update(
        UpdateStatement::new("t_order")
            .with_assignment(Assignment::new("user_id", Expression::literal(2)))
            .with_where(Expression::equals(Expression::column("user_id"), Expression::literal(1))),
    );
    let pipeline = fixture.pipeline(&PlannerConfig::default());

    assert_db_validation_error(
        pipeline.plan(&context(statement), scan("t_order"), &[]),
        ValidationErrorType::ShardingKeyUpdateForbidden,
    );
}
