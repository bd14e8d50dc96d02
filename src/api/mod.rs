// ==========================================
// MooTracker 牧场管理系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行与上层界面调用
// ==========================================

pub mod alert_api;
pub mod error;

// 重导出核心类型
pub use alert_api::{AlertApi, AlertBoard};
pub use error::{ApiError, ApiResult};
