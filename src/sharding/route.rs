//! 路由
//!
//! 根据分片规则、分片条件和 Hint 值把一组逻辑表解析为路由单元。

use std::fmt;

use serde::{Deserialize, Serialize};

use super::algorithm::{ShardingAlgorithm, ShardingStrategy};
use super::condition::{ShardingCondition, ShardingConditions};
use super::rule::{DataNode, ShardingRule, TableRule};
use super::ShardingRuleError;
use crate::core::Value;

/// 外部提供的 Hint 分片值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HintValues {
    pub database_values: Vec<Value>,
    pub table_values: Vec<Value>,
}

impl HintValues {
    pub fn new(database_values: Vec<Value>, table_values: Vec<Value>) -> Self {
        Self {
            database_values,
            table_values,
        }
    }

    /// 数据库和表两个维度都已给出
    pub fn is_complete(&self) -> bool {
        !self.database_values.is_empty() && !self.table_values.is_empty()
    }
}

/// 逻辑名到物理名的映射
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteMapper {
    pub logic_name: String,
    pub actual_name: String,
}

impl RouteMapper {
    pub fn new(logic_name: impl Into<String>, actual_name: impl Into<String>) -> Self {
        Self {
            logic_name: logic_name.into(),
            actual_name: actual_name.into(),
        }
    }

    fn identity(name: &str) -> Self {
        Self::new(name, name)
    }
}

/// 路由单元：一个数据源以及其上的物理表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteUnit {
    pub data_source_name: String,
    pub table_mappers: Vec<RouteMapper>,
}

impl RouteUnit {
    pub fn new(data_source_name: impl Into<String>) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            table_mappers: Vec::new(),
        }
    }

    pub fn find_actual_table(&self, logic_table: &str) -> Option<&str> {
        self.table_mappers
            .iter()
            .find(|m| m.logic_name.eq_ignore_ascii_case(logic_table))
            .map(|m| m.actual_name.as_str())
    }
}

impl fmt::Display for RouteUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables: Vec<String> = self
            .table_mappers
            .iter()
            .map(|m| format!("{}->{}", m.logic_name, m.actual_name))
            .collect();
        write!(f, "{}[{}]", self.data_source_name, tables.join(", "))
    }
}

/// 路由结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteContext {
    pub route_units: Vec<RouteUnit>,
    pub parameters: Vec<Value>,
}

impl RouteContext {
    pub fn new(route_units: Vec<RouteUnit>, parameters: Vec<Value>) -> Self {
        Self {
            route_units,
            parameters,
        }
    }

    pub fn is_single_routing(&self) -> bool {
        self.route_units.len() == 1
    }

    pub fn route_unit_count(&self) -> usize {
        self.route_units.len()
    }

    pub fn data_source_names(&self) -> Vec<&str> {
        let mut result: Vec<&str> = Vec::new();
        for unit in &self.route_units {
            if !result.contains(&unit.data_source_name.as_str()) {
                result.push(&unit.data_source_name);
            }
        }
        result
    }
}

/// 路由器
#[derive(Debug, Clone, Copy)]
pub struct ShardingRouter<'a> {
    rule: &'a ShardingRule,
    hint: &'a HintValues,
}

impl<'a> ShardingRouter<'a> {
    pub fn new(rule: &'a ShardingRule, hint: &'a HintValues) -> Self {
        Self { rule, hint }
    }

    /// 计算一组逻辑表的路由单元
    ///
    /// 第一张分片表为主表；绑定表按主表节点的位置映射，广播表附加到每个单元。
    /// 分片值无法被算法映射时返回 [`ShardingRuleError::UnroutableShardingValue`]。
    pub fn route<S: AsRef<str>>(
        &self,
        tables: &[S],
        conditions: &ShardingConditions,
    ) -> Result<Vec<RouteUnit>, ShardingRuleError> {
        let mut sharded: Vec<&TableRule> = Vec::new();
        let mut broadcast: Vec<String> = Vec::new();
        let mut singles: Vec<String> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for table in tables {
            let table = table.as_ref();
            if seen.iter().any(|t| t.eq_ignore_ascii_case(table)) {
                continue;
            }
            seen.push(table.to_string());
            if let Some(table_rule) = self.rule.find_table_rule(table) {
                sharded.push(table_rule);
            } else if self.rule.is_broadcast_table(table) {
                broadcast.push(table.to_string());
            } else {
                singles.push(table.to_string());
            }
        }

        let mut units = match sharded.split_first() {
            Some((primary, others)) => self.route_sharding(primary, others, &singles, conditions)?,
            None => self.route_unsharded(&singles),
        };
        for unit in &mut units {
            unit.table_mappers
                .extend(broadcast.iter().map(|t| RouteMapper::identity(t)));
        }
        Ok(units)
    }

    fn route_unsharded(&self, singles: &[String]) -> Vec<RouteUnit> {
        if singles.is_empty() {
            return self
                .rule
                .data_source_names()
                .first()
                .map(|ds| vec![RouteUnit::new(ds.clone())])
                .unwrap_or_default();
        }
        let mut units: Vec<RouteUnit> = Vec::new();
        for table in singles {
            let Some(data_source) = self.rule.single_table_data_source(table) else {
                continue;
            };
            match units.iter_mut().find(|u| u.data_source_name == data_source) {
                Some(unit) => unit.table_mappers.push(RouteMapper::identity(table)),
                None => {
                    let mut unit = RouteUnit::new(data_source);
                    unit.table_mappers.push(RouteMapper::identity(table));
                    units.push(unit);
                }
            }
        }
        units
    }

    fn route_sharding(
        &self,
        primary: &TableRule,
        others: &[&TableRule],
        singles: &[String],
        conditions: &ShardingConditions,
    ) -> Result<Vec<RouteUnit>, ShardingRuleError> {
        let mut units: Vec<RouteUnit> = Vec::new();
        for node in self.route_data_nodes(primary, conditions)? {
            let mut combinations = vec![vec![RouteMapper::new(primary.logic_table(), node.table.as_str())]];
            for other in others {
                let candidates = self.route_joined_table(primary, other, &node, conditions)?;
                let mut next = Vec::new();
                for mappers in &combinations {
                    for candidate in &candidates {
                        let mut extended = mappers.clone();
                        extended.push(candidate.clone());
                        next.push(extended);
                    }
                }
                combinations = next;
            }
            let local_singles: Vec<RouteMapper> = singles
                .iter()
                .filter(|t| self.rule.single_table_data_source(t) == Some(node.data_source.as_str()))
                .map(|t| RouteMapper::identity(t))
                .collect();
            for mut mappers in combinations {
                mappers.extend(local_singles.iter().cloned());
                let unit = RouteUnit {
                    data_source_name: node.data_source.clone(),
                    table_mappers: mappers,
                };
                if !units.contains(&unit) {
                    units.push(unit);
                }
            }
        }
        Ok(units)
    }

    fn route_joined_table(
        &self,
        primary: &TableRule,
        other: &TableRule,
        node: &DataNode,
        conditions: &ShardingConditions,
    ) -> Result<Vec<RouteMapper>, ShardingRuleError> {
        if self
            .rule
            .is_all_binding_tables(&[primary.logic_table(), other.logic_table()])
        {
            return Ok(primary
                .position_of(node)
                .and_then(|index| other.actual_data_nodes().get(index))
                .filter(|bound| bound.data_source == node.data_source)
                .map(|bound| vec![RouteMapper::new(other.logic_table(), bound.table.as_str())])
                .unwrap_or_default());
        }
        Ok(self
            .route_data_nodes(other, conditions)?
            .into_iter()
            .filter(|n| n.data_source == node.data_source)
            .map(|n| RouteMapper::new(other.logic_table(), n.table))
            .collect())
    }

    /// 单张分片表命中的数据节点，按配置顺序
    pub fn route_data_nodes(
        &self,
        table_rule: &TableRule,
        conditions: &ShardingConditions,
    ) -> Result<Vec<DataNode>, ShardingRuleError> {
        let unconditioned = ShardingCondition::default();
        let branches: Vec<&ShardingCondition> = if conditions.is_empty() {
            vec![&unconditioned]
        } else {
            conditions.iter().collect()
        };

        let mut result: Vec<DataNode> = Vec::new();
        for branch in branches {
            let data_sources = self.route_dimension(
                table_rule.logic_table(),
                table_rule.database_strategy(),
                table_rule.data_source_names(),
                branch,
                &self.hint.database_values,
            )?;
            for data_source in data_sources {
                let tables = self.route_dimension(
                    table_rule.logic_table(),
                    table_rule.table_strategy(),
                    table_rule.actual_tables(&data_source),
                    branch,
                    &self.hint.table_values,
                )?;
                for table in tables {
                    let node = DataNode::new(data_source.clone(), table);
                    if !result.contains(&node) {
                        result.push(node);
                    }
                }
            }
        }
        result.sort_by_key(|node| table_rule.position_of(node));
        Ok(result)
    }

    /// 缺少分片值的维度路由到全部目标；同一列上的谓词交集为空时同样如此
    fn route_dimension(
        &self,
        table: &str,
        strategy: &ShardingStrategy,
        targets: Vec<String>,
        branch: &ShardingCondition,
        hint_values: &[Value],
    ) -> Result<Vec<String>, ShardingRuleError> {
        match strategy {
            ShardingStrategy::None => Ok(targets),
            ShardingStrategy::Standard {
                sharding_column,
                algorithm,
            } => match branch.values_for(table, sharding_column) {
                Some(values) if !values.is_empty() => {
                    select_targets(table, algorithm, &targets, values.iter().map(|v| vec![v]))
                }
                _ => Ok(targets),
            },
            ShardingStrategy::Complex {
                sharding_columns,
                algorithm,
            } => {
                let per_column = sharding_columns
                    .iter()
                    .map(|column| branch.values_for(table, column).filter(|values| !values.is_empty()))
                    .collect::<Option<Vec<_>>>();
                match per_column {
                    Some(lists) => select_targets(table, algorithm, &targets, cartesian(&lists)),
                    None => Ok(targets),
                }
            }
            ShardingStrategy::Hint { algorithm } => {
                if hint_values.is_empty() {
                    Ok(targets)
                } else {
                    select_targets(table, algorithm, &targets, hint_values.iter().map(|v| vec![v]))
                }
            }
        }
    }
}

/// 每个取值组合必须映射到一个目标，不能静默丢弃
fn select_targets<'v, I>(
    table: &str,
    algorithm: &ShardingAlgorithm,
    targets: &[String],
    combinations: I,
) -> Result<Vec<String>, ShardingRuleError>
where
    I: IntoIterator<Item = Vec<&'v Value>>,
{
    let mut result: Vec<String> = Vec::new();
    if targets.is_empty() {
        return Ok(result);
    }
    for combination in combinations {
        let target = algorithm.do_sharding(targets, &combination).ok_or_else(|| {
            let values: Vec<String> = combination.iter().map(|v| v.to_string()).collect();
            ShardingRuleError::UnroutableShardingValue {
                table: table.to_string(),
                values: format!("[{}]", values.join(", ")),
            }
        })?;
        if !result.contains(target) {
            result.push(target.clone());
        }
    }
    Ok(result)
}

fn cartesian<'v>(lists: &[&'v [Value]]) -> Vec<Vec<&'v Value>> {
    let mut result: Vec<Vec<&'v Value>> = vec![Vec::new()];
    for &list in lists {
        let mut next = Vec::new();
        for prefix in &result {
            for value in list {
                let mut extended = prefix.clone();
                extended.push(value);
                next.push(extended);
            }
        }
        result = next;
    }
    result
}
