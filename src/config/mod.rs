use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::DBResult;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub planner: PlannerConfig,
    pub log: LogConfig,
}

/// 下推规划配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlannerConfig {
    /// 重写器到达不动点前的最大轮数
    pub max_rewrite_iterations: usize,
    pub enable_filter_push_down: bool,
    pub enable_projection_push_down: bool,
    pub enable_aggregate_push_down: bool,
    pub enable_join_push_down: bool,
    pub enable_sort_push_down: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_rewrite_iterations: 16,
            enable_filter_push_down: true,
            enable_projection_push_down: true,
            enable_aggregate_push_down: true,
            enable_join_push_down: true,
            enable_sort_push_down: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "shardfed".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> DBResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> DBResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> DBResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.planner.max_rewrite_iterations, 16);
        assert!(config.planner.enable_sort_push_down);
        assert_eq!(config.log.file, "shardfed");
    }

    #[test]
    fn test_config_load_save() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        let mut config = Config::default();
        config.planner.enable_join_push_down = false;
        let toml_content =
            toml::to_string_pretty(&config).expect("Failed to serialize config to TOML");
        temp_file
            .write_all(toml_content.as_bytes())
            .expect("Failed to write TOML content to temporary file");

        let loaded_config =
            Config::load(temp_file.path()).expect("Failed to load config from temporary file");
        assert_eq!(config, loaded_config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml_str("[planner]\nenable_sort_push_down = false\n")
            .expect("Failed to parse partial config");
        assert!(!config.planner.enable_sort_push_down);
        assert!(config.planner.enable_filter_push_down);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_save_to_dir() {
        let dir = tempfile::tempdir().expect("Failed to create temporary dir");
        let path = dir.path().join("shardfed.toml");
        Config::default().save(&path).expect("Failed to save config");
        assert_eq!(Config::load(&path).expect("Failed to load config"), Config::default());
    }
}
