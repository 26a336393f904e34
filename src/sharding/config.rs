//! 分片规则配置
//!
//! 配置以 TOML 描述，解析后经 [`ShardingRule::new`](super::ShardingRule::new) 校验为运行期规则。

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::algorithm::ShardingStrategy;
use crate::core::error::{DBError, DBResult};

/// 分片规则配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardingRuleConfiguration {
    /// 数据源名称；为空时从分片表和单表中推导
    pub data_sources: Vec<String>,
    /// 分片表
    pub tables: Vec<TableRuleConfiguration>,
    /// 绑定表组
    pub binding_tables: Vec<Vec<String>>,
    /// 广播表
    pub broadcast_tables: Vec<String>,
    /// 单表：表名 -> 数据源
    pub single_tables: BTreeMap<String, String>,
}

/// 分片表配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRuleConfiguration {
    pub logic_table: String,
    /// 形如 `ds_0.t_order_0` 的数据节点
    pub actual_data_nodes: Vec<String>,
    #[serde(default)]
    pub database_strategy: ShardingStrategy,
    #[serde(default)]
    pub table_strategy: ShardingStrategy,
    #[serde(default)]
    pub key_generate_column: Option<String>,
}

impl ShardingRuleConfiguration {
    pub fn from_toml_str(content: &str) -> DBResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> DBResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> DBResult<String> {
        toml::to_string_pretty(self).map_err(DBError::from)
    }
}
