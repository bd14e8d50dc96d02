// ==========================================
// MooTracker 牧场管理系统 - 规则阈值读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::classifier_config::ClassifierConfig;
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ClassifierConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ClassifierConfigReader: Send + Sync {
    // ===== 犊牛 =====

    /// 耳标窗口（天）
    ///
    /// # 默认值
    /// - (15, 30)
    async fn get_ear_tag_window_days(&self) -> Result<(i64, i64), Box<dyn Error>>;

    /// 断奶窗口（月）
    ///
    /// # 默认值
    /// - (6, 8)
    async fn get_weaning_window_months(&self) -> Result<(i64, i64), Box<dyn Error>>;

    // ===== 转群 =====

    /// 犊牛转育成的月龄
    ///
    /// # 默认值
    /// - 12
    async fn get_transition_min_months(&self) -> Result<i64, Box<dyn Error>>;

    /// 成年月龄（配种/出售）
    ///
    /// # 默认值
    /// - 24
    async fn get_adult_months(&self) -> Result<i64, Box<dyn Error>>;

    // ===== 繁殖 =====

    /// 妊娠检查窗口（配种后天数）
    ///
    /// # 默认值
    /// - (75, 90)
    async fn get_vv_window_days(&self) -> Result<(i64, i64), Box<dyn Error>>;

    async fn get_feed_withdrawal_days(&self) -> Result<i64, Box<dyn Error>>;

    async fn get_rcc_vaccine_days(&self) -> Result<i64, Box<dyn Error>>;

    async fn get_maternity_move_days(&self) -> Result<i64, Box<dyn Error>>;

    // ===== 展示 =====

    /// 可汇总提醒是否按圈舍合并
    ///
    /// # 默认值
    /// - true
    async fn get_aggregate_in_pens(&self) -> Result<bool, Box<dyn Error>>;

    /// 组装完整阈值
    async fn load_classifier_config(&self) -> Result<ClassifierConfig, Box<dyn Error>> {
        let (ear_tag_min_days, ear_tag_max_days) = self.get_ear_tag_window_days().await?;
        let (weaning_min_months, weaning_max_months) = self.get_weaning_window_months().await?;
        let transition_min_months = self.get_transition_min_months().await?;
        let adult_months = self.get_adult_months().await?;
        let (vv_window_start_days, vv_window_end_days) = self.get_vv_window_days().await?;
        let feed_withdrawal_days = self.get_feed_withdrawal_days().await?;
        let rcc_vaccine_days = self.get_rcc_vaccine_days().await?;
        let maternity_move_days = self.get_maternity_move_days().await?;
        let aggregate_in_pens = self.get_aggregate_in_pens().await?;

        Ok(ClassifierConfig {
            ear_tag_min_days,
            ear_tag_max_days,
            weaning_min_months,
            weaning_max_months,
            transition_min_months,
            adult_months,
            vv_window_start_days,
            vv_window_end_days,
            feed_withdrawal_days,
            rcc_vaccine_days,
            maternity_move_days,
            aggregate_in_pens,
        })
    }
}
