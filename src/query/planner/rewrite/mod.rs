//! 计划重写模块
//!
//! 下推规则在规划阶段直接应用，把联邦层算子尽可能折叠进分片本地扫描。
//! 规则无法匹配时保持输入不变，改写不会失败。
//!
//! # 模块结构
//!
//! - `context`: 重写上下文（分片规则、参数、分片条件、Hint）
//! - `pattern`: 模式匹配定义
//! - `result`: 重写结果定义
//! - `rule`: 重写规则 trait 定义
//! - `rule_enum`: 规则枚举与注册表
//! - `plan_rewriter`: 不动点重写器
//! - `pushdown`: 下推规则

pub mod context;
pub mod pattern;
pub mod plan_rewriter;
pub mod pushdown;
pub mod result;
pub mod rule;
pub mod rule_enum;

pub use context::RewriteContext;
pub use pattern::{MatchNode, Pattern, RoutingPredicate};
pub use plan_rewriter::PlanRewriter;
pub use result::TransformResult;
pub use rule::{PushDownRule, RewriteRule as RewriteRuleTrait};
pub use rule_enum::{RewriteRule, RuleRegistry};
