// ==========================================
// MooTracker 牧场管理系统 - 任务领域模型
// ==========================================
// 职责: 由提醒转化而来的持久化待办
// 说明: 任务独立于生成它的提醒存在
// ==========================================

use crate::domain::types::{AlertPriority, AlertType, SubjectType, TaskStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 任务ID
pub type TaskId = String;

// ==========================================
// Task - 待办任务
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub alert_id: String,           // 来源提醒
    pub alert_type: AlertType,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: AlertPriority,
    pub notes: Option<String>,
    pub status: TaskStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// ==========================================
// TaskOverrides - 创建任务时的用户覆写
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOverrides {
    pub title: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<AlertPriority>,
    pub notes: Option<String>,
}
