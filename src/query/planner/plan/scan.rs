//! 逻辑扫描
//!
//! 尚未路由的基表读取。下推进来的算子按应用顺序记录在 `operators` 中，
//! 由分片本地执行。扫描是值类型：下推返回新的扫描，不修改原值。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::collation::Collation;
use super::row_bound::RowBound;
use crate::core::types::{AggregateFunction, Expression};
use crate::query::statement::table::{distinct_table_names, TableRef};
use crate::sharding::{RouteUnit, ShardingConditions, ShardingRouter, ShardingRuleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }
}

/// 聚合调用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateCall {
    pub function: AggregateFunction,
    /// 参数列位置
    pub args: Vec<usize>,
    pub distinct: bool,
    pub name: String,
}

impl AggregateCall {
    pub fn new(function: AggregateFunction, args: Vec<usize>, name: impl Into<String>) -> Self {
        Self {
            function,
            args,
            distinct: false,
            name: name.into(),
        }
    }
}

/// 延迟到分片本地执行的算子
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DeferredOperator {
    Filter {
        condition: Expression,
    },
    Project {
        expressions: Vec<Expression>,
    },
    Aggregate {
        group_keys: Vec<usize>,
        aggregates: Vec<AggregateCall>,
    },
    Sort {
        collation: Collation,
        offset: Option<RowBound>,
        fetch: Option<RowBound>,
    },
    /// 与另一扫描在分片本地连接
    Join {
        join_type: JoinType,
        condition: Expression,
        right: Box<LogicalScan>,
    },
}

impl DeferredOperator {
    pub fn name(&self) -> &'static str {
        match self {
            DeferredOperator::Filter { .. } => "Filter",
            DeferredOperator::Project { .. } => "Project",
            DeferredOperator::Aggregate { .. } => "Aggregate",
            DeferredOperator::Sort { .. } => "Sort",
            DeferredOperator::Join { .. } => "Join",
        }
    }
}

impl fmt::Display for DeferredOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferredOperator::Filter { condition } => write!(f, "Filter({})", condition),
            DeferredOperator::Project { expressions } => {
                let items: Vec<String> = expressions.iter().map(|e| e.to_string()).collect();
                write!(f, "Project({})", items.join(", "))
            }
            DeferredOperator::Aggregate { group_keys, aggregates } => {
                let calls: Vec<String> = aggregates.iter().map(|a| format!("{}{:?}", a.function.name(), a.args)).collect();
                write!(f, "Aggregate(group={:?}, {})", group_keys, calls.join(", "))
            }
            DeferredOperator::Sort { collation, offset, fetch } => {
                write!(f, "Sort({}", collation)?;
                if let Some(offset) = offset {
                    write!(f, ", offset={}", offset)?;
                }
                if let Some(fetch) = fetch {
                    write!(f, ", fetch={}", fetch)?;
                }
                write!(f, ")")
            }
            DeferredOperator::Join { join_type, condition, right } => {
                write!(f, "{}Join({}, {})", join_type.as_str(), condition, right)
            }
        }
    }
}

/// 逻辑扫描
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalScan {
    schema: String,
    /// 全部基表，包括已并入的连接右侧
    tables: Vec<TableRef>,
    operators: Vec<DeferredOperator>,
}

impl LogicalScan {
    pub fn new(schema: impl Into<String>, table: TableRef) -> Self {
        Self {
            schema: schema.into(),
            tables: vec![table],
            operators: Vec::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    pub fn table_names(&self) -> Vec<String> {
        distinct_table_names(&self.tables)
    }

    pub fn operators(&self) -> &[DeferredOperator] {
        &self.operators
    }

    /// 追加一个延迟算子，返回新的扫描
    pub fn pushdown(&self, operator: DeferredOperator) -> LogicalScan {
        let mut scan = self.clone();
        scan.operators.push(operator);
        scan
    }

    /// 并入连接右侧，返回新的扫描
    pub fn join(&self, join_type: JoinType, condition: Expression, right: &LogicalScan) -> LogicalScan {
        let mut scan = self.clone();
        scan.tables.extend(right.tables.iter().cloned());
        scan.operators.push(DeferredOperator::Join {
            join_type,
            condition,
            right: Box::new(right.clone()),
        });
        scan
    }

    pub fn has_aggregate(&self) -> bool {
        self.operators
            .iter()
            .any(|op| matches!(op, DeferredOperator::Aggregate { .. }))
    }

    /// 已下推带 FETCH 的排序
    pub fn has_bounded_sort(&self) -> bool {
        self.operators
            .iter()
            .any(|op| matches!(op, DeferredOperator::Sort { fetch: Some(_), .. }))
    }

    /// 约束本扫描路由的谓词，以及每个谓词生效时可见的基表
    ///
    /// 只有投影和聚合之前下推的过滤仍作用于基表列；并入的连接右侧扫描贡献它自己的谓词。
    /// 外层语句或其他查询块的条件不会出现在这里。
    pub fn routing_predicates(&self) -> Vec<(&[TableRef], &Expression)> {
        let mut result = Vec::new();
        let mut visible = self.tables.len().min(1);
        let mut reshaped = false;
        for operator in &self.operators {
            match operator {
                DeferredOperator::Filter { condition } if !reshaped => {
                    result.push((&self.tables[..visible], condition));
                }
                DeferredOperator::Project { .. } | DeferredOperator::Aggregate { .. } => reshaped = true,
                DeferredOperator::Join { right, .. } => {
                    visible = (visible + right.tables.len()).min(self.tables.len());
                    result.extend(right.routing_predicates());
                }
                _ => {}
            }
        }
        result
    }

    /// 按给定条件计算路由单元，每次调用都重新计算
    pub fn route_units(
        &self,
        router: &ShardingRouter<'_>,
        conditions: &ShardingConditions,
    ) -> Result<Vec<RouteUnit>, ShardingRuleError> {
        let tables = self.table_names();
        router.route(&tables, &conditions.restrict_to(&tables))
    }

    /// 是否恰好落在一个路由单元上；无法路由时视为否
    pub fn is_single_routing(&self, router: &ShardingRouter<'_>, conditions: &ShardingConditions) -> bool {
        matches!(self.route_units(router, conditions), Ok(units) if units.len() == 1)
    }
}

impl fmt::Display for LogicalScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        write!(f, "Scan({}.[{}]", self.schema, tables.join(", "))?;
        for operator in &self.operators {
            write!(f, " -> {}", operator)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::sharding::{
        HintValues, ShardingAlgorithm, ShardingCondition, ShardingConditionValue, ShardingRule,
        ShardingRuleConfiguration, ShardingStrategy, TableRuleConfiguration,
    };

    fn rule() -> ShardingRule {
        ShardingRule::new(ShardingRuleConfiguration {
            tables: vec![TableRuleConfiguration {
                logic_table: "t_order".into(),
                actual_data_nodes: vec!["ds_0.t_order_0".into(), "ds_1.t_order_1".into()],
                database_strategy: ShardingStrategy::Standard {
                    sharding_column: "user_id".into(),
                    algorithm: ShardingAlgorithm::Modulo { sharding_count: 2 },
                },
                table_strategy: ShardingStrategy::None,
                key_generate_column: None,
            }],
            broadcast_tables: vec!["t_config".into()],
            ..Default::default()
        })
        .expect("规则应有效")
    }

    #[test]
    fn test_pushdown_returns_new_value() {
        let scan = LogicalScan::new("logic_db", TableRef::new("t_order"));
        let pushed = scan.pushdown(DeferredOperator::Filter {
            condition: Expression::equals(Expression::column("user_id"), Expression::literal(1)),
        });
        assert!(scan.operators().is_empty());
        assert_eq!(pushed.operators().len(), 1);
        assert_eq!(pushed.operators()[0].name(), "Filter");
    }

    #[test]
    fn test_single_routing_follows_conditions() {
        let rule = rule();
        let hint = HintValues::default();
        let router = ShardingRouter::new(&rule, &hint);
        let scan = LogicalScan::new("logic_db", TableRef::new("t_order"));
        assert!(!scan.is_single_routing(&router, &ShardingConditions::empty()));

        let mut branch = ShardingCondition::default();
        branch.add(ShardingConditionValue {
            table_name: "t_order".into(),
            column_name: "user_id".into(),
            values: vec![Value::Int(1)],
            parameter_marker_indexes: vec![],
        });
        let conditions = ShardingConditions::new(vec![branch]);
        assert!(scan.is_single_routing(&router, &conditions));

        let broadcast = LogicalScan::new("logic_db", TableRef::new("t_config"));
        assert!(broadcast.is_single_routing(&router, &conditions));
    }

    #[test]
    fn test_routing_predicates_stop_at_projection() {
        let user_filter = Expression::equals(Expression::column("user_id"), Expression::literal(1));
        let having = Expression::equals(Expression::column("cnt"), Expression::literal(1));
        let scan = LogicalScan::new("logic_db", TableRef::new("t_order"))
            .pushdown(DeferredOperator::Filter {
                condition: user_filter.clone(),
            })
            .pushdown(DeferredOperator::Aggregate {
                group_keys: vec![0],
                aggregates: Vec::new(),
            })
            .pushdown(DeferredOperator::Filter { condition: having });

        let predicates = scan.routing_predicates();
        assert_eq!(predicates.len(), 1);
        assert_eq!(predicates[0].1, &user_filter);
        assert_eq!(predicates[0].0, &[TableRef::new("t_order")][..]);
        assert!(LogicalScan::new("logic_db", TableRef::new("t_order")).routing_predicates().is_empty());
    }

    #[test]
    fn test_routing_predicates_include_joined_side() {
        let left_filter = Expression::equals(Expression::column("user_id"), Expression::literal(1));
        let right_filter = Expression::equals(Expression::column("user_id"), Expression::literal(2));
        let left = LogicalScan::new("logic_db", TableRef::new("t_order")).pushdown(DeferredOperator::Filter {
            condition: left_filter.clone(),
        });
        let right = LogicalScan::new("logic_db", TableRef::new("t_order_item")).pushdown(DeferredOperator::Filter {
            condition: right_filter.clone(),
        });
        let joined = left
            .join(JoinType::Inner, Expression::literal(true), &right)
            .pushdown(DeferredOperator::Filter {
                condition: Expression::literal(true),
            });

        let predicates = joined.routing_predicates();
        assert_eq!(predicates.len(), 3);
        assert_eq!(predicates[0].0.len(), 1);
        assert_eq!(predicates[1], (&[TableRef::new("t_order_item")][..], &right_filter));
        assert_eq!(predicates[2].0.len(), 2);
    }

    #[test]
    fn test_join_collects_tables() {
        let left = LogicalScan::new("logic_db", TableRef::new("t_order"));
        let right = LogicalScan::new("logic_db", TableRef::new("t_config"));
        let joined = left.join(JoinType::Inner, Expression::literal(true), &right);
        assert_eq!(joined.table_names(), vec!["t_order", "t_config"]);
        assert!(joined.to_string().contains("INNERJoin"));
    }
}
