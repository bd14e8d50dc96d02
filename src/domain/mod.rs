// ==========================================
// MooTracker 牧场管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod alert;
pub mod animal;
pub mod pen;
pub mod task;
pub mod types;

// 重导出核心类型
pub use alert::{alert_id, Alert, AlertState};
pub use animal::{AnimalSnapshot, EventLogEntry};
pub use pen::PenSnapshot;
pub use task::{Task, TaskId, TaskOverrides};
pub use types::{
    AlertPriority, AlertStateKind, AlertType, AnimalCategory, AnimalStatus, EventTag, PenFunction,
    PenType, PregnancyStatus, Sex, SubjectType, TaskStatus, ALL_ALERT_TYPES,
};
