// ==========================================
// MooTracker 牧场管理系统 - 提醒领域模型
// ==========================================
// 职责: 提醒引擎的输出（纯计算视图,不是数据源）
// 红线: due_date 只由存储日期 + 固定偏移推导,从不持久化为提醒状态
// ==========================================

use crate::domain::types::{AlertPriority, AlertStateKind, AlertType, SubjectType};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 由 (主体, 提醒类型) 推导稳定的提醒ID
///
/// 同一输入多次计算得到相同ID,用于去重和暂缓状态持久化
pub fn alert_id(subject_type: SubjectType, subject_id: &str, alert_type: AlertType) -> String {
    format!(
        "{}:{}:{}",
        subject_type.as_id_prefix(),
        subject_id,
        alert_type.as_str()
    )
}

// ==========================================
// Alert - 提醒
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub due_date: NaiveDate,
    pub days_overdue: i64,               // 负数=未到期, >=0 已到期/超期
    pub affected_ids: BTreeSet<String>,  // 汇总的牛只ID
    pub resolvable: bool,
    pub message: String,
}

impl Alert {
    /// 构造提醒,ID 与 days_overdue 在此统一推导
    pub fn new(
        subject_type: SubjectType,
        subject_id: impl Into<String>,
        alert_type: AlertType,
        priority: AlertPriority,
        due_date: NaiveDate,
        today: NaiveDate,
        affected_ids: BTreeSet<String>,
        message: String,
    ) -> Self {
        let subject_id = subject_id.into();
        Self {
            id: alert_id(subject_type, &subject_id, alert_type),
            subject_type,
            subject_id,
            alert_type,
            priority,
            due_date,
            days_overdue: (today - due_date).num_days(),
            affected_ids,
            resolvable: alert_type.is_resolvable(),
            message,
        }
    }
}

// ==========================================
// AlertState - 用户对提醒的处理记录
// ==========================================
// 引擎不读取;应用边界据此过滤已暂缓/已处理的提醒
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub alert_id: String,
    pub state: AlertStateKind,
    pub snoozed_until: Option<NaiveDate>,     // 暂缓至（不含当天）
    pub resolved_due_date: Option<NaiveDate>, // 处理时提醒的到期日
    pub updated_by: String,
    pub updated_at: NaiveDateTime,
}

impl AlertState {
    /// 该处理记录在 `today` 是否仍然隐藏 `alert`
    ///
    /// - 暂缓: today < snoozed_until
    /// - 已处理: 仅对同一到期日的提醒生效（到期日变化视为新事件）
    pub fn hides(&self, alert: &Alert, today: NaiveDate) -> bool {
        if !alert.resolvable || self.alert_id != alert.id {
            return false;
        }
        match self.state {
            AlertStateKind::Snoozed => self.snoozed_until.map_or(false, |until| today < until),
            AlertStateKind::Resolved => self.resolved_due_date == Some(alert.due_date),
        }
    }
}
