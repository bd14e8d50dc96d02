// ==========================================
// MooTracker 牧场管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod alert_state_repo;
pub mod animal_repo;
pub mod error;
pub mod event_log_repo;
pub mod pen_repo;
mod row;
pub mod task_repo;

// 重导出核心仓储
pub use alert_state_repo::AlertStateRepository;
pub use animal_repo::{AnimalRepository, PregnancyUpdate};
pub use error::{RepositoryError, RepositoryResult};
pub use event_log_repo::EventLogRepository;
pub use pen_repo::PenRepository;
pub use task_repo::TaskRepository;
