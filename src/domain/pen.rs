// ==========================================
// MooTracker 牧场管理系统 - 圈舍领域模型
// ==========================================

use crate::domain::types::{PenFunction, PenType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// PenSnapshot - 圈舍快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenSnapshot {
    pub id: String,                     // 圈舍ID
    pub number: String,                 // 圈舍编号（展示用）
    #[serde(rename = "type")]
    pub pen_type: PenType,              // 物理类型
    pub capacity: u32,                  // 容量 (> 0)
    #[serde(default)]
    pub occupant_ids: BTreeSet<String>, // 当前在圈牛只
    pub current_function: PenFunction,  // 当前功能
}

impl PenSnapshot {
    pub fn new(
        id: impl Into<String>,
        number: impl Into<String>,
        pen_type: PenType,
        capacity: u32,
        current_function: PenFunction,
    ) -> Self {
        Self {
            id: id.into(),
            number: number.into(),
            pen_type,
            capacity,
            occupant_ids: BTreeSet::new(),
            current_function,
        }
    }

    pub fn occupancy(&self) -> usize {
        self.occupant_ids.len()
    }

    pub fn is_over_capacity(&self) -> bool {
        self.occupancy() > self.capacity as usize
    }

    /// 空圈是否值得提醒（产房空置属正常）
    pub fn reports_when_empty(&self) -> bool {
        matches!(self.pen_type, PenType::Outdoor | PenType::Barn)
    }
}
