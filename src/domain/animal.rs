// ==========================================
// MooTracker 牧场管理系统 - 牛只领域模型
// ==========================================
// 职责: 提醒引擎的只读输入快照
// 红线: 快照交给引擎后调用方不得修改
// ==========================================

use crate::domain::types::{AnimalCategory, AnimalStatus, EventTag, PregnancyStatus, Sex};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// EventLogEntry - 结构化事件记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub tag: EventTag,        // 事件标签
    pub date: NaiveDate,      // 事件日期
    #[serde(default)]
    pub note: Option<String>, // 备注（仅展示,不参与判定）
}

impl EventLogEntry {
    pub fn new(tag: EventTag, date: NaiveDate) -> Self {
        Self { tag, date, note: None }
    }
}

// ==========================================
// AnimalSnapshot - 牛只快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimalSnapshot {
    // ===== 标识 =====
    pub id: String,                         // 内部ID（稳定、唯一）
    #[serde(default)]
    pub enar: Option<String>,               // ENAR 耳标号（展示用）

    // ===== 基础属性 =====
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,      // 出生日期（缺失时跳过年龄规则）
    pub sex: Sex,
    pub category: AnimalCategory,
    pub status: AnimalStatus,

    // ===== 关联 =====
    #[serde(default)]
    pub mother_id: Option<String>,          // 母牛ID（存在即视为未断奶）
    #[serde(default)]
    pub current_pen_id: Option<String>,     // 当前圈舍（唯一权威来源）

    // ===== 繁殖 =====
    #[serde(default)]
    pub pregnancy_status: Option<PregnancyStatus>,
    #[serde(default)]
    pub pairing_date: Option<NaiveDate>,        // 配种/合群日期
    #[serde(default)]
    pub vv_date: Option<NaiveDate>,             // 妊娠检查日期
    #[serde(default)]
    pub expected_birth_date: Option<NaiveDate>, // 预产期
    #[serde(default)]
    pub weaning_date: Option<NaiveDate>,        // 断奶日期

    // ===== 历史 =====
    #[serde(default)]
    pub last_event_log: Vec<EventLogEntry>,
}

impl AnimalSnapshot {
    /// 创建最小快照（测试与导入共用）
    pub fn new(
        id: impl Into<String>,
        sex: Sex,
        category: AnimalCategory,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id: id.into(),
            enar: None,
            birth_date,
            sex,
            category,
            status: AnimalStatus::Active,
            mother_id: None,
            current_pen_id: None,
            pregnancy_status: None,
            pairing_date: None,
            vv_date: None,
            expected_birth_date: None,
            weaning_date: None,
            last_event_log: Vec::new(),
        }
    }

    /// 展示标识: ENAR 优先,否则内部ID
    pub fn display_id(&self) -> &str {
        match self.enar.as_deref() {
            Some(enar) if !enar.trim().is_empty() => enar,
            _ => &self.id,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AnimalStatus::Active
    }

    /// 是否仍在哺乳期
    pub fn is_nursing(&self) -> bool {
        self.mother_id.is_some()
    }

    pub fn is_pregnant(&self) -> bool {
        self.pregnancy_status == Some(PregnancyStatus::Pregnant)
    }

    /// 事件日志中是否已有 `on_or_after` 当天或之后的 `tag` 记录
    pub fn has_event_since(&self, tag: EventTag, on_or_after: NaiveDate) -> bool {
        self.last_event_log
            .iter()
            .any(|e| e.tag == tag && e.date >= on_or_after)
    }
}
