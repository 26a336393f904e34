//! 重写结果定义

use crate::query::planner::plan::LogicalPlan;

/// 转换结果
///
/// 规则成功时返回替换匹配子树的新节点。规则拒绝时返回 `None`，
/// 原节点保持不变，因此改写不存在失败路径。
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub new_node: LogicalPlan,
}

impl TransformResult {
    pub fn new(new_node: LogicalPlan) -> Self {
        Self { new_node }
    }

    pub fn into_node(self) -> LogicalPlan {
        self.new_node
    }
}
