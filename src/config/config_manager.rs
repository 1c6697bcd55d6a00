// ==========================================
// 发票催收汇总系统 - 配置管理器
// ==========================================
// 职责: 配置加载与多级覆写
// 优先级（低 → 高）:
//   1. 内置默认值
//   2. JSON 配置文件（显式路径, 否则用户配置目录下的 config.json）
//   3. 环境变量
//   4. 命令行参数（由调用方通过 config_mut 写入）
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::pipeline_config::PipelineConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 配置相关常量
pub mod config_keys {
    /// 用户配置目录下的子目录名
    pub const APP_CONFIG_DIR: &str = "recobro-facturas";
    pub const CONFIG_FILE_NAME: &str = "config.json";

    // ===== 环境变量 =====
    pub const ENV_CSV_DELIMITER: &str = "RECOBRO_CSV_DELIMITER";
    pub const ENV_DATE_COLUMNS: &str = "RECOBRO_DATE_COLUMNS"; // 逗号分隔
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config: PipelineConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 以给定配置创建（不读文件, 不读环境变量）
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            config,
            source: None,
        }
    }

    /// 按优先级加载配置（不含命令行层）
    ///
    /// # 参数
    /// - explicit_path: 显式配置文件路径; 指定但不存在时报错
    pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Self> {
        let source = match explicit_path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        let config = match &source {
            Some(path) => Self::load_file(path)?,
            None => PipelineConfig::default(),
        };

        let mut manager = Self { config, source };
        manager.apply_env_overrides(|key| std::env::var(key).ok())?;
        manager.config.validate()?;

        info!(
            source = %manager.source_label(),
            "配置加载完成"
        );
        Ok(manager)
    }

    /// 用户配置目录下的默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(config_keys::APP_CONFIG_DIR)
                .join(config_keys::CONFIG_FILE_NAME)
        })
    }

    /// 读取 JSON 配置文件（缺省字段取默认值）
    pub fn load_file(path: &Path) -> ConfigResult<PipelineConfig> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
            path: path.display().to_string(),
            source,
        })?;
        let config: PipelineConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ParseError {
                path: path.display().to_string(),
                source,
            })?;
        debug!(path = %path.display(), "配置文件已读取");
        Ok(config)
    }

    /// 应用环境变量覆写
    ///
    /// # 参数
    /// - lookup: 环境变量读取函数（测试中可注入）
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(config_keys::ENV_CSV_DELIMITER) {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(delimiter), None) => {
                    self.config.csv_delimiter = delimiter;
                    debug!(key = config_keys::ENV_CSV_DELIMITER, "环境变量覆写");
                }
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: config_keys::ENV_CSV_DELIMITER.to_string(),
                        value: raw,
                        message: "必须是单个字符".to_string(),
                    })
                }
            }
        }

        if let Some(raw) = lookup(config_keys::ENV_DATE_COLUMNS) {
            self.config.date_columns = raw
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            debug!(key = config_keys::ENV_DATE_COLUMNS, "环境变量覆写");
        }

        Ok(())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 命令行层覆写入口
    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn source_label(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "内置默认值".to_string())
    }

    /// 获取当前生效配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 运行开始时记录, 便于事后复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.config)?)
    }
}
