// ==========================================
// MooTracker 牧场管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 提醒看板 (人工决定是否转为任务)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "hu");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 提醒规则
pub mod engine;

// 配置层 - 规则阈值
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertPriority, AlertType, AnimalCategory, AnimalStatus, EventTag, PenFunction, PenType,
    PregnancyStatus, Sex, SubjectType, TaskStatus,
};

// 领域实体
pub use domain::{Alert, AlertState, AnimalSnapshot, EventLogEntry, PenSnapshot, Task, TaskOverrides};

// 引擎
pub use engine::{ClassifierError, EventClassifier, TaskSink};

// 配置
pub use config::{ClassifierConfig, ConfigManager};

// API
pub use api::{AlertApi, AlertBoard, ApiError};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "MooTracker";
