// ==========================================
// MooTracker 牧场管理系统 - 配置层
// ==========================================
// 职责: 提醒规则阈值的读取与覆写
// 存储: config_kv 表
// ==========================================

pub mod classifier_config;
pub mod classifier_config_reader;
pub mod config_manager;

// 重导出核心配置
pub use classifier_config::ClassifierConfig;
pub use classifier_config_reader::ClassifierConfigReader;
pub use config_manager::{config_keys, ConfigManager};
