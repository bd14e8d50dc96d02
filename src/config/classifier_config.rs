// ==========================================
// MooTracker 牧场管理系统 - 提醒规则阈值配置
// ==========================================
// 职责: 规则表使用的全部阈值,默认值与现场使用的口径一致
// 存储: config_kv 表 (见 config_manager)
// ==========================================

use serde::{Deserialize, Serialize};

/// 天数类阈值上限（约 10 年）
pub const MAX_WINDOW_DAYS: i64 = 3650;
/// 月数类阈值上限（50 年）
pub const MAX_WINDOW_MONTHS: i64 = 600;

// ==========================================
// ClassifierConfig - 规则阈值
// ==========================================
// 窗口均为闭区间 [min, max]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    // ===== 犊牛: 耳标 + 疫苗 (天) =====
    pub ear_tag_min_days: i64,
    pub ear_tag_max_days: i64,

    // ===== 犊牛: 断奶 (月) =====
    pub weaning_min_months: i64,
    pub weaning_max_months: i64,

    // ===== 转群 (月) =====
    pub transition_min_months: i64, // 犊牛 → 育成
    pub adult_months: i64,          // 成年（配种/出售）

    // ===== 妊娠检查 (配种后天数) =====
    pub vv_window_start_days: i64,
    pub vv_window_end_days: i64,

    // ===== 产前 (距预产期天数) =====
    pub feed_withdrawal_days: i64,
    pub rcc_vaccine_days: i64,
    pub maternity_move_days: i64,

    // ===== 圈舍汇总 =====
    pub aggregate_in_pens: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ear_tag_min_days: 15,
            ear_tag_max_days: 30,
            weaning_min_months: 6,
            weaning_max_months: 8,
            transition_min_months: 12,
            adult_months: 24,
            vv_window_start_days: 75,
            vv_window_end_days: 90,
            feed_withdrawal_days: 14,
            rcc_vaccine_days: 42,
            maternity_move_days: 7,
            aggregate_in_pens: true,
        }
    }
}

impl ClassifierConfig {
    /// 校验阈值的一致性
    ///
    /// # 返回
    /// - Ok(()): 配置有效
    /// - Err(String): 第一个不合法项的说明
    pub fn validate(&self) -> Result<(), String> {
        let windows = [
            ("ear_tag", self.ear_tag_min_days, self.ear_tag_max_days, MAX_WINDOW_DAYS),
            ("weaning", self.weaning_min_months, self.weaning_max_months, MAX_WINDOW_MONTHS),
            ("transition", self.transition_min_months, self.adult_months, MAX_WINDOW_MONTHS),
            ("vv_window", self.vv_window_start_days, self.vv_window_end_days, MAX_WINDOW_DAYS),
        ];
        for (name, min, max, limit) in windows {
            if min < 0 || min > max || max > limit {
                return Err(format!("{} 窗口无效: min={}, max={} (上限 {})", name, min, max, limit));
            }
        }
        // 12 月转群窗口为 [transition_min, adult) 半开区间,不能为空
        if self.transition_min_months == self.adult_months {
            return Err(format!(
                "transition 窗口为空: transition_min_months={} = adult_months",
                self.transition_min_months
            ));
        }

        let pre_birth = [
            ("feed_withdrawal_days", self.feed_withdrawal_days),
            ("rcc_vaccine_days", self.rcc_vaccine_days),
            ("maternity_move_days", self.maternity_move_days),
        ];
        for (name, days) in pre_birth {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(format!("{} 超出范围 [0, {}]: {}", name, MAX_WINDOW_DAYS, days));
            }
        }

        Ok(())
    }
}
