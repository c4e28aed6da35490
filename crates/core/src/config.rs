//! 批量执行配置
//!
//! 批量写入和元数据查询的分片大小是注入式配置，组件不内置常量。

use serde::{Deserialize, Serialize};

use crate::errors::{BatchRunError, BatchRunResult};

/// 任务级批量写入的默认分片大小（任务项、队列明细、报告步骤）
pub const DEFAULT_TASK_BATCH_SIZE: usize = 600;
/// 场景元数据查询的默认分片大小，限制单次查询规模
pub const DEFAULT_SELECT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchRunConfig {
    /// 任务级批量写入分片大小
    pub task_batch_size: usize,
    /// 场景元数据查询分片大小
    pub select_batch_size: usize,
}

impl Default for BatchRunConfig {
    fn default() -> Self {
        Self {
            task_batch_size: DEFAULT_TASK_BATCH_SIZE,
            select_batch_size: DEFAULT_SELECT_BATCH_SIZE,
        }
    }
}

impl BatchRunConfig {
    /// 从TOML文件加载配置，环境变量优先于文件内容
    pub fn from_file(path: &str) -> BatchRunResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BatchRunError::Configuration(format!("读取配置文件失败 {path}: {e}")))?;
        let mut config: BatchRunConfig = toml::from_str(&content)
            .map_err(|e| BatchRunError::Configuration(format!("解析配置文件失败 {path}: {e}")))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 从环境变量加载配置，未设置的字段使用默认值
    pub fn from_env() -> BatchRunResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(size) = env_usize("BATCHRUN_TASK_BATCH_SIZE") {
            self.task_batch_size = size;
        }
        if let Some(size) = env_usize("BATCHRUN_SELECT_BATCH_SIZE") {
            self.select_batch_size = size;
        }
    }

    pub fn validate(&self) -> BatchRunResult<()> {
        if self.task_batch_size == 0 {
            return Err(BatchRunError::config_error("task_batch_size 必须大于 0"));
        }
        if self.select_batch_size == 0 {
            return Err(BatchRunError::config_error("select_batch_size 必须大于 0"));
        }
        Ok(())
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BatchRunConfig::default();
        assert_eq!(config.task_batch_size, 600);
        assert_eq!(config.select_batch_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = BatchRunConfig {
            task_batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BatchRunConfig = toml::from_str("task_batch_size = 300").unwrap();
        assert_eq!(config.task_batch_size, 300);
        assert_eq!(config.select_batch_size, DEFAULT_SELECT_BATCH_SIZE);
    }
}
