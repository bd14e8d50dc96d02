// ==========================================
// MooTracker 牧场管理系统 - 引擎层
// ==========================================
// 职责: 提醒规则引擎,不拼 SQL
// 红线: 引擎为纯计算,today 由调用方注入
// ==========================================

pub mod age;
pub mod classifier;
pub mod error;
pub mod pen_rules;
pub mod rules;
pub mod sink;

// 重导出核心引擎
pub use age::{days_since, days_until, months_since, DAYS_PER_MONTH};
pub use classifier::{dedup_alerts, sort_alerts, AnimalHit, EventClassifier};
pub use error::{ClassifierError, ClassifierResult};
pub use rules::{AnimalRule, RuleContext, RuleHit, RuleOutcome, ANIMAL_RULES};
pub use sink::{NoOpTaskSink, OptionalTaskSink, TaskSink};
