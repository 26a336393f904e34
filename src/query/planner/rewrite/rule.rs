//! 重写规则 trait 定义
//!
//! 下推规则把父算子折叠进逻辑扫描；无法折叠时返回 `None`，
//! 父算子留在联邦层执行，结果依然正确。

use std::fmt::Debug;

use crate::query::planner::plan::{LogicalPlan, LogicalScan};
use crate::query::planner::rewrite::context::RewriteContext;
use crate::query::planner::rewrite::pattern::Pattern;
use crate::query::planner::rewrite::result::TransformResult;

/// 重写规则 trait
pub trait RewriteRule: Debug + Send + Sync {
    /// 规则名称
    fn name(&self) -> &'static str;

    /// 规则匹配的操作数形状
    fn pattern(&self) -> Pattern;

    /// 应用重写规则
    ///
    /// - `Some(result)`: 重写成功，用新节点替换匹配子树
    /// - `None`: 拒绝，保持原节点
    fn apply(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> Option<TransformResult>;

    fn matches(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan) -> bool {
        self.pattern().matches(node, ctx)
    }
}

/// 下推规则 trait
///
/// `target` 是父节点下方的逻辑扫描（连接规则中为左侧扫描）。
pub trait PushDownRule: RewriteRule {
    /// 检查是否可以下推
    fn can_push_down(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> bool;

    /// 执行下推，返回合并后的节点
    fn push_down(&self, ctx: &RewriteContext<'_>, node: &LogicalPlan, target: &LogicalScan) -> Option<TransformResult>;
}

/// 单输入父节点的通用下推流程
pub(crate) fn push_into_child_scan<R: PushDownRule + ?Sized>(
    rule: &R,
    ctx: &RewriteContext<'_>,
    node: &LogicalPlan,
) -> Option<TransformResult> {
    let target = node.inputs().first()?.as_scan()?;
    if !rule.can_push_down(ctx, node, target) {
        return None;
    }
    rule.push_down(ctx, node, target)
}
