// ==========================================
// MooTracker 牧场管理系统 - 圈舍级规则
// ==========================================
// 职责: 空圈 / 超员提醒,以及按圈舍汇总的牛只提醒
// 说明: 只有超员规则,没有"未满"提醒
// ==========================================

use crate::domain::alert::Alert;
use crate::domain::pen::PenSnapshot;
use crate::domain::types::{AlertPriority, AlertType, SubjectType};
use crate::i18n::t_with_args;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};

/// 汇总到圈舍的单头牛只命中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenMember {
    pub animal_id: String,
    pub due_date: NaiveDate,
    pub priority: AlertPriority,
}

// ==========================================
// 空圈 / 超员
// ==========================================

/// 计算圈舍自身的提醒
///
/// # 参数
/// - `inactive_ids`: 非在群牛只ID,不得出现在 affected_ids 中
pub fn evaluate_pen(pen: &PenSnapshot, inactive_ids: &HashSet<&str>, today: NaiveDate) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if pen.occupant_ids.is_empty() && pen.reports_when_empty() {
        alerts.push(Alert::new(
            SubjectType::Pen,
            pen.id.clone(),
            AlertType::PenEmpty,
            AlertPriority::Low,
            today,
            today,
            BTreeSet::new(),
            t_with_args(
                &AlertType::PenEmpty.message_key(),
                &[("pen", pen.number.as_str())],
            ),
        ));
    }

    if pen.is_over_capacity() {
        let affected: BTreeSet<String> = pen
            .occupant_ids
            .iter()
            .filter(|id| !inactive_ids.contains(id.as_str()))
            .cloned()
            .collect();
        let count = pen.occupancy().to_string();
        let capacity = pen.capacity.to_string();
        alerts.push(Alert::new(
            SubjectType::Pen,
            pen.id.clone(),
            AlertType::PenOvercapacity,
            AlertPriority::High,
            today,
            today,
            affected,
            t_with_args(
                &AlertType::PenOvercapacity.message_key(),
                &[
                    ("pen", pen.number.as_str()),
                    ("count", count.as_str()),
                    ("capacity", capacity.as_str()),
                ],
            ),
        ));
    }

    alerts
}

// ==========================================
// 圈舍汇总
// ==========================================

/// 把同一圈舍内同类型的牛只提醒合并为一条
///
/// - affected_ids: 全部成员
/// - due_date: 成员中最早的到期日
/// - priority: 成员中最高的优先级
///
/// 成员为空时返回 None
pub fn aggregate_members(
    pen: &PenSnapshot,
    alert_type: AlertType,
    members: &[PenMember],
    today: NaiveDate,
) -> Option<Alert> {
    let due_date = members.iter().map(|m| m.due_date).min()?;
    let priority = members.iter().map(|m| m.priority).max()?;
    let affected: BTreeSet<String> = members.iter().map(|m| m.animal_id.clone()).collect();

    let count = affected.len().to_string();
    let message = t_with_args(
        &format!("pen_alerts.{}", alert_type.as_str()),
        &[("pen", pen.number.as_str()), ("count", count.as_str())],
    );

    Some(Alert::new(
        SubjectType::Pen,
        pen.id.clone(),
        alert_type,
        priority,
        due_date,
        today,
        affected,
        message,
    ))
}
