//! 配置与日志集成测试
//!
//! 测试范围:
//! - config::Config - 规划器与日志配置的加载和保存
//! - sharding::ShardingRuleConfiguration - 分片规则文件加载与校验
//! - utils::logging - flexi_logger 初始化与关闭

mod common;

use std::fs;

use common::assertions::assert_ok;
use common::{sharding_config, SHARDING_TOML};
use shardfed::config::{Config, PlannerConfig};
use shardfed::core::error::DBError;
use shardfed::query::planner::PlanRewriter;
use shardfed::sharding::{ShardingRule, ShardingRuleConfiguration, ShardingRuleError};
use shardfed::utils::logging;

// ==================== 规划器与日志配置 ====================

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.log.level, "info");
    assert_eq!(config.log.dir, "logs");
    assert_eq!(config.log.file, "shardfed");
    assert_eq!(config.log.max_file_size, 100 * 1024 * 1024);
    assert_eq!(config.log.max_files, 5);
    assert!(config.planner.enable_join_push_down);
    assert!(config.planner.max_rewrite_iterations > 0);
}

#[test]
fn test_config_save_and_load() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("shardfed.toml");

    let mut config = Config::default();
    config.log.level = "debug".to_string();
    config.log.max_files = 3;
    config.planner.enable_aggregate_push_down = false;
    config.planner.max_rewrite_iterations = 4;
    assert_ok(config.save(&path));

    let content = fs::read_to_string(&path).expect("读取配置文件失败");
    assert!(content.contains("[planner]"));
    assert!(content.contains("enable_aggregate_push_down = false"));

    let loaded = assert_ok(Config::load(&path));
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = assert_ok(Config::from_toml_str("[log]\nlevel = \"warn\"\n"));

    assert_eq!(config.log.level, "warn");
    assert_eq!(config.log.file, "shardfed");
    assert_eq!(config.planner, PlannerConfig::default());
}

#[test]
fn test_malformed_config_is_config_error() {
    let result = Config::from_toml_str("[planner]\nmax_rewrite_iterations = \"many\"\n");
    assert!(matches!(result, Err(DBError::Config(_))));
}

#[test]
fn test_rewriter_honours_disabled_rules() {
    let config = PlannerConfig {
        enable_sort_push_down: false,
        enable_join_push_down: false,
        ..PlannerConfig::default()
    };
    let enabled = PlanRewriter::from_config(&PlannerConfig::default()).registry().len();
    let reduced = PlanRewriter::from_config(&config).registry().len();
    assert_eq!(enabled - reduced, 3);
}

// ==================== 分片规则配置 ====================

#[test]
fn test_sharding_config_from_file() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let path = dir.path().join("sharding.toml");
    fs::write(&path, SHARDING_TOML).expect("写入分片配置失败");

    let config = assert_ok(ShardingRuleConfiguration::load(&path));
    assert_eq!(config, sharding_config());

    let rule = assert_ok(ShardingRule::new(config));
    assert!(rule.is_sharding_table("t_order"));
    assert!(rule.is_broadcast_table("t_config"));
    assert_eq!(rule.single_table_data_source("t_user"), Some("ds_0"));
    assert!(rule.is_all_binding_tables(&["t_order", "t_order_item"]));
    assert_eq!(rule.find_generate_key_column("t_order"), Some("order_id"));
}

#[test]
fn test_sharding_config_survives_toml_round_trip() {
    let config = sharding_config();
    let text = assert_ok(config.to_toml_string());
    assert_eq!(assert_ok(ShardingRuleConfiguration::from_toml_str(&text)), config);
}

#[test]
fn test_binding_tables_with_different_layouts_are_rejected() {
    let mut config = sharding_config();
    config.tables[1].actual_data_nodes.truncate(2);

    let result = ShardingRule::new(config);
    assert!(matches!(result, Err(ShardingRuleError::InconsistentBindingTables(_))));
}

#[test]
fn test_unknown_data_source_is_rejected() {
    let mut config = sharding_config();
    config.single_tables.insert("t_audit".to_string(), "ds_9".to_string());

    let result = ShardingRule::new(config);
    assert!(matches!(result, Err(ShardingRuleError::UnknownDataSource(_))));
}

// ==================== 日志 ====================

/// flexi_logger 使用全局 logger，日志相关断言集中在一个测试中
#[test]
fn test_logging_writes_to_configured_directory() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let mut config = Config::default();
    config.log.dir = dir.path().to_string_lossy().into_owned();
    config.log.file = "planner_test".to_string();

    assert_ok(logging::init(&config.log));
    assert!(logging::is_initialized());
    // 重复初始化直接成功
    assert_ok(logging::init(&config.log));

    log::info!("集成测试日志");
    logging::shutdown();
    assert!(!logging::is_initialized());

    let log_files: Vec<_> = fs::read_dir(dir.path())
        .expect("读取日志目录失败")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("planner_test"))
        .collect();
    assert!(!log_files.is_empty(), "应该至少有一个日志文件");
}
