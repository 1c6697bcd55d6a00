// ==========================================
// 发票催收汇总系统 - 配置层
// ==========================================
// 职责: 流水线配置管理, 支持多级覆写
// 来源: 默认值 → JSON 文件 → 环境变量 → 命令行
// ==========================================

pub mod config_manager;
pub mod error;
pub mod pipeline_config;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
pub use pipeline_config::PipelineConfig;
