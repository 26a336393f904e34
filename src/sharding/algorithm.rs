//! 分片算法与分片策略
//!
//! 算法把分片值映射为目标数据源或目标物理表。目标选择优先匹配名称以
//! `_<index>` 结尾的目标（如 `ds_1`、`t_order_1`），否则按位置取模。

use serde::{Deserialize, Serialize};

use crate::core::Value;

/// 分片算法
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShardingAlgorithm {
    /// 整数取模：index = sum(values) mod sharding_count
    Modulo { sharding_count: u32 },
    /// 哈希取模：index = fnv1a(values) mod sharding_count
    HashMod { sharding_count: u32 },
    /// 范围：index = 不大于分片值的边界数量
    Range { boundaries: Vec<i64> },
}

impl ShardingAlgorithm {
    /// 计算目标
    ///
    /// `values` 为一组分片列的取值（标准策略只有一个）。
    /// 取值无法映射时返回 None，由调用方报告路由错误。
    pub fn do_sharding<'a>(&self, targets: &'a [String], values: &[&Value]) -> Option<&'a String> {
        if targets.is_empty() || values.is_empty() {
            return None;
        }
        let index = self.shard_index(values)?;
        let suffix = format!("_{}", index);
        targets
            .iter()
            .find(|target| target.ends_with(&suffix))
            .or_else(|| targets.get(index % targets.len()))
    }

    fn shard_index(&self, values: &[&Value]) -> Option<usize> {
        match self {
            ShardingAlgorithm::Modulo { sharding_count } => {
                if *sharding_count == 0 {
                    return None;
                }
                let sum = values
                    .iter()
                    .try_fold(0i64, |acc, v| integral(v).map(|x| acc.wrapping_add(x)))?;
                usize::try_from(sum.rem_euclid(i64::from(*sharding_count))).ok()
            }
            ShardingAlgorithm::HashMod { sharding_count } => {
                if *sharding_count == 0 {
                    return None;
                }
                let hash = values.iter().fold(FNV_OFFSET, |acc, v| fnv1a(acc, &canonical_key(v)));
                usize::try_from(hash % u64::from(*sharding_count)).ok()
            }
            ShardingAlgorithm::Range { boundaries } => {
                let value = integral(values.first()?)?;
                Some(boundaries.iter().filter(|b| **b <= value).count())
            }
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(mut hash: u64, bytes: &str) -> u64 {
    for b in bytes.as_bytes() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// 整数取值；数字字符串按十进制解析
fn integral(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_i64(),
    }
}

// 不同宽度的整数以及数字字符串必须落到同一个分片
fn canonical_key(value: &Value) -> String {
    match integral(value) {
        Some(v) => v.to_string(),
        None => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// 分片策略
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShardingStrategy {
    /// 不分片：路由到该维度的全部目标
    #[default]
    None,
    /// 单列分片
    Standard {
        sharding_column: String,
        algorithm: ShardingAlgorithm,
    },
    /// 多列分片
    Complex {
        sharding_columns: Vec<String>,
        algorithm: ShardingAlgorithm,
    },
    /// 由外部提供的 Hint 值驱动
    Hint { algorithm: ShardingAlgorithm },
}

impl ShardingStrategy {
    /// 策略使用的分片列
    pub fn sharding_columns(&self) -> Vec<&str> {
        match self {
            ShardingStrategy::Standard { sharding_column, .. } => vec![sharding_column.as_str()],
            ShardingStrategy::Complex { sharding_columns, .. } => {
                sharding_columns.iter().map(|c| c.as_str()).collect()
            }
            ShardingStrategy::None | ShardingStrategy::Hint { .. } => Vec::new(),
        }
    }

    pub fn is_hint(&self) -> bool {
        matches!(self, ShardingStrategy::Hint { .. })
    }
}
