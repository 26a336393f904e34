//! 分片规则
//!
//! 运行期只读的规则视图：分片表、绑定表组、广播表和单表。
//! 表名查找不区分大小写。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::algorithm::ShardingStrategy;
use super::config::{ShardingRuleConfiguration, TableRuleConfiguration};
use super::ShardingRuleError;

/// 数据节点：数据源 + 物理表
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataNode {
    pub data_source: String,
    pub table: String,
}

impl DataNode {
    pub fn new(data_source: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            table: table.into(),
        }
    }

    /// 解析 `ds.table` 形式的节点
    pub fn parse(text: &str) -> Result<Self, ShardingRuleError> {
        match text.trim().split_once('.') {
            Some((ds, table)) if !ds.is_empty() && !table.is_empty() && !table.contains('.') => {
                Ok(Self::new(ds, table))
            }
            _ => Err(ShardingRuleError::InvalidDataNode(text.to_string())),
        }
    }
}

impl std::fmt::Display for DataNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.data_source, self.table)
    }
}

/// 分片表规则
#[derive(Debug, Clone)]
pub struct TableRule {
    logic_table: String,
    actual_data_nodes: Vec<DataNode>,
    database_strategy: ShardingStrategy,
    table_strategy: ShardingStrategy,
    key_generate_column: Option<String>,
}

impl TableRule {
    fn from_config(config: TableRuleConfiguration) -> Result<Self, ShardingRuleError> {
        if config.actual_data_nodes.is_empty() {
            return Err(ShardingRuleError::EmptyDataNodes(config.logic_table));
        }
        let actual_data_nodes = config
            .actual_data_nodes
            .iter()
            .map(|node| DataNode::parse(node))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            logic_table: config.logic_table,
            actual_data_nodes,
            database_strategy: config.database_strategy,
            table_strategy: config.table_strategy,
            key_generate_column: config.key_generate_column,
        })
    }

    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    pub fn actual_data_nodes(&self) -> &[DataNode] {
        &self.actual_data_nodes
    }

    /// 涉及的数据源，按首次出现的顺序
    pub fn data_source_names(&self) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for node in &self.actual_data_nodes {
            if !result.contains(&node.data_source) {
                result.push(node.data_source.clone());
            }
        }
        result
    }

    /// 某数据源上的物理表
    pub fn actual_tables(&self, data_source: &str) -> Vec<String> {
        self.actual_data_nodes
            .iter()
            .filter(|node| node.data_source == data_source)
            .map(|node| node.table.clone())
            .collect()
    }

    pub fn database_strategy(&self) -> &ShardingStrategy {
        &self.database_strategy
    }

    pub fn table_strategy(&self) -> &ShardingStrategy {
        &self.table_strategy
    }

    pub fn key_generate_column(&self) -> Option<&str> {
        self.key_generate_column.as_deref()
    }

    /// 数据库与表两个维度的全部分片列
    pub fn sharding_columns(&self) -> Vec<&str> {
        let mut columns = self.database_strategy.sharding_columns();
        for column in self.table_strategy.sharding_columns() {
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                columns.push(column);
            }
        }
        columns
    }

    pub fn find_sharding_column(&self, column: &str) -> Option<&str> {
        self.sharding_columns()
            .into_iter()
            .find(|c| c.eq_ignore_ascii_case(column))
    }

    /// 两个维度都由 Hint 驱动
    pub fn is_hint_routed(&self) -> bool {
        self.database_strategy.is_hint() && self.table_strategy.is_hint()
    }

    pub fn position_of(&self, node: &DataNode) -> Option<usize> {
        self.actual_data_nodes.iter().position(|n| n == node)
    }
}

/// 绑定表组
#[derive(Debug, Clone)]
pub struct BindingTableRule {
    tables: Vec<String>,
}

impl BindingTableRule {
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t.eq_ignore_ascii_case(table))
    }
}

/// 分片规则
#[derive(Debug, Clone)]
pub struct ShardingRule {
    data_source_names: Vec<String>,
    table_rules: BTreeMap<String, TableRule>,
    binding_table_rules: Vec<BindingTableRule>,
    broadcast_tables: BTreeSet<String>,
    single_tables: BTreeMap<String, String>,
}

fn key(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl ShardingRule {
    /// 校验配置并构建规则
    pub fn new(config: ShardingRuleConfiguration) -> Result<Self, ShardingRuleError> {
        let mut table_rules = BTreeMap::new();
        for table_config in config.tables {
            let rule = TableRule::from_config(table_config)?;
            let name = key(rule.logic_table());
            if table_rules.contains_key(&name) {
                return Err(ShardingRuleError::DuplicateTable(rule.logic_table));
            }
            table_rules.insert(name, rule);
        }

        let mut broadcast_tables = BTreeSet::new();
        for table in &config.broadcast_tables {
            let name = key(table);
            if table_rules.contains_key(&name) || !broadcast_tables.insert(name) {
                return Err(ShardingRuleError::TableInMultipleCategories(table.clone()));
            }
        }

        let mut single_tables = BTreeMap::new();
        for (table, data_source) in &config.single_tables {
            let name = key(table);
            if table_rules.contains_key(&name) || broadcast_tables.contains(&name) {
                return Err(ShardingRuleError::TableInMultipleCategories(table.clone()));
            }
            single_tables.insert(name, data_source.clone());
        }

        let mut binding_table_rules = Vec::new();
        for group in config.binding_tables {
            let mut node_count = None;
            for table in &group {
                let table_rule = table_rules
                    .get(&key(table))
                    .ok_or_else(|| ShardingRuleError::UnknownBindingTable(table.clone()))?;
                let count = table_rule.actual_data_nodes().len();
                if *node_count.get_or_insert(count) != count {
                    return Err(ShardingRuleError::InconsistentBindingTables(group.join(",")));
                }
            }
            let tables: Vec<String> = group.iter().map(|t| key(t)).collect();
            if binding_table_rules
                .iter()
                .any(|existing: &BindingTableRule| tables.iter().any(|t| existing.contains(t)))
            {
                return Err(ShardingRuleError::TableInMultipleCategories(group.join(",")));
            }
            binding_table_rules.push(BindingTableRule { tables });
        }

        let data_source_names = if config.data_sources.is_empty() {
            let mut names: Vec<String> = Vec::new();
            let derived = table_rules
                .values()
                .flat_map(|rule| rule.data_source_names())
                .chain(single_tables.values().cloned());
            for name in derived {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            names
        } else {
            let known = &config.data_sources;
            let referenced = table_rules
                .values()
                .flat_map(|rule| rule.data_source_names())
                .chain(single_tables.values().cloned());
            for name in referenced {
                if !known.contains(&name) {
                    return Err(ShardingRuleError::UnknownDataSource(name));
                }
            }
            config.data_sources
        };

        Ok(Self {
            data_source_names,
            table_rules,
            binding_table_rules,
            broadcast_tables,
            single_tables,
        })
    }

    pub fn data_source_names(&self) -> &[String] {
        &self.data_source_names
    }

    pub fn find_table_rule(&self, table: &str) -> Option<&TableRule> {
        self.table_rules.get(&key(table))
    }

    pub fn table_rules(&self) -> impl Iterator<Item = &TableRule> {
        self.table_rules.values()
    }

    pub fn is_sharding_table(&self, table: &str) -> bool {
        self.table_rules.contains_key(&key(table))
    }

    pub fn is_broadcast_table(&self, table: &str) -> bool {
        self.broadcast_tables.contains(&key(table))
    }

    pub fn find_single_table_data_source(&self, table: &str) -> Option<&str> {
        self.single_tables.get(&key(table)).map(String::as_str)
    }

    /// 未纳入分片、广播或单表配置的表，视为默认数据源上的单表
    pub fn is_single_table(&self, table: &str) -> bool {
        !self.is_sharding_table(table) && !self.is_broadcast_table(table)
    }

    /// 单表所在的数据源；未配置的表落在第一个数据源
    pub fn single_table_data_source(&self, table: &str) -> Option<&str> {
        self.find_single_table_data_source(table)
            .or_else(|| self.data_source_names.first().map(String::as_str))
    }

    pub fn is_all_broadcast_tables<S: AsRef<str>>(&self, tables: &[S]) -> bool {
        !tables.is_empty() && tables.iter().all(|t| self.is_broadcast_table(t.as_ref()))
    }

    pub fn contains_sharding_table<S: AsRef<str>>(&self, tables: &[S]) -> bool {
        tables.iter().any(|t| self.is_sharding_table(t.as_ref()))
    }

    /// 过滤出分片表，去重并保持顺序
    pub fn sharding_table_names<S: AsRef<str>>(&self, tables: &[S]) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();
        for table in tables {
            let table = table.as_ref();
            if self.is_sharding_table(table) && !result.iter().any(|t| t.eq_ignore_ascii_case(table)) {
                result.push(table.to_string());
            }
        }
        result
    }

    pub fn find_binding_table_rule(&self, table: &str) -> Option<&BindingTableRule> {
        self.binding_table_rules.iter().find(|rule| rule.contains(table))
    }

    /// 全部是同一绑定组中的分片表；单独一张分片表也成立
    pub fn is_all_binding_tables<S: AsRef<str>>(&self, tables: &[S]) -> bool {
        let names = self.sharding_table_names(tables);
        if names.is_empty() || names.len() != distinct_count(tables) {
            return false;
        }
        if names.len() == 1 {
            return true;
        }
        match self.find_binding_table_rule(&names[0]) {
            Some(binding) => names.iter().all(|t| binding.contains(t)),
            None => false,
        }
    }

    /// 返回配置中的分片列名称
    pub fn find_sharding_column(&self, column: &str, table: &str) -> Option<&str> {
        self.find_table_rule(table)?.find_sharding_column(column)
    }

    pub fn is_sharding_column(&self, column: &str, table: &str) -> bool {
        self.find_sharding_column(column, table).is_some()
    }

    pub fn find_generate_key_column(&self, table: &str) -> Option<&str> {
        self.find_table_rule(table)?.key_generate_column()
    }
}

fn distinct_count<S: AsRef<str>>(tables: &[S]) -> usize {
    tables
        .iter()
        .map(|t| key(t.as_ref()))
        .collect::<BTreeSet<_>>()
        .len()
}
