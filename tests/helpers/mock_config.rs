// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use moo_tracker::config::{ClassifierConfig, ClassifierConfigReader};
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mock 配置结构
///
/// `fail` 置位后所有读取返回错误,用于模拟配置存储不可用
#[derive(Debug, Default)]
pub struct MockConfig {
    pub config: ClassifierConfig,
    fail: AtomicBool,
}

impl MockConfig {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            fail: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), Box<dyn Error>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("配置存储不可用".into());
        }
        Ok(())
    }
}

#[async_trait]
impl ClassifierConfigReader for MockConfig {
    async fn get_ear_tag_window_days(&self) -> Result<(i64, i64), Box<dyn Error>> {
        self.check()?;
        Ok((self.config.ear_tag_min_days, self.config.ear_tag_max_days))
    }

    async fn get_weaning_window_months(&self) -> Result<(i64, i64), Box<dyn Error>> {
        self.check()?;
        Ok((self.config.weaning_min_months, self.config.weaning_max_months))
    }

    async fn get_transition_min_months(&self) -> Result<i64, Box<dyn Error>> {
        self.check()?;
        Ok(self.config.transition_min_months)
    }

    async fn get_adult_months(&self) -> Result<i64, Box<dyn Error>> {
        self.check()?;
        Ok(self.config.adult_months)
    }

    async fn get_vv_window_days(&self) -> Result<(i64, i64), Box<dyn Error>> {
        self.check()?;
        Ok((self.config.vv_window_start_days, self.config.vv_window_end_days))
    }

    async fn get_feed_withdrawal_days(&self) -> Result<i64, Box<dyn Error>> {
        self.check()?;
        Ok(self.config.feed_withdrawal_days)
    }

    async fn get_rcc_vaccine_days(&self) -> Result<i64, Box<dyn Error>> {
        self.check()?;
        Ok(self.config.rcc_vaccine_days)
    }

    async fn get_maternity_move_days(&self) -> Result<i64, Box<dyn Error>> {
        self.check()?;
        Ok(self.config.maternity_move_days)
    }

    async fn get_aggregate_in_pens(&self) -> Result<bool, Box<dyn Error>> {
        self.check()?;
        Ok(self.config.aggregate_in_pens)
    }
}
