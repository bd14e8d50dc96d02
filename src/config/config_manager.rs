// ==========================================
// MooTracker 牧场管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 说明: 缺失或无法解析的值回落到 ClassifierConfig::default()
// ==========================================

use crate::config::classifier_config::ClassifierConfig;
use crate::config::classifier_config_reader::ClassifierConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 读取数值配置,缺失或格式错误时返回默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy,
    {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 返回
    /// - Ok(String): 配置快照的JSON字符串（按 key 排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 把完整阈值写回 config_kv
    pub fn save_classifier_config(&self, config: &ClassifierConfig) -> Result<(), Box<dyn Error>> {
        config.validate()?;

        let pairs = [
            (config_keys::EAR_TAG_MIN_DAYS, config.ear_tag_min_days.to_string()),
            (config_keys::EAR_TAG_MAX_DAYS, config.ear_tag_max_days.to_string()),
            (config_keys::WEANING_MIN_MONTHS, config.weaning_min_months.to_string()),
            (config_keys::WEANING_MAX_MONTHS, config.weaning_max_months.to_string()),
            (config_keys::TRANSITION_MIN_MONTHS, config.transition_min_months.to_string()),
            (config_keys::ADULT_MONTHS, config.adult_months.to_string()),
            (config_keys::VV_WINDOW_START_DAYS, config.vv_window_start_days.to_string()),
            (config_keys::VV_WINDOW_END_DAYS, config.vv_window_end_days.to_string()),
            (config_keys::FEED_WITHDRAWAL_DAYS, config.feed_withdrawal_days.to_string()),
            (config_keys::RCC_VACCINE_DAYS, config.rcc_vaccine_days.to_string()),
            (config_keys::MATERNITY_MOVE_DAYS, config.maternity_move_days.to_string()),
            (config_keys::AGGREGATE_IN_PENS, config.aggregate_in_pens.to_string()),
        ];
        for (key, value) in pairs.iter() {
            self.set_global_config_value(key, value)?;
        }
        Ok(())
    }
}

// ==========================================
// ClassifierConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ClassifierConfigReader for ConfigManager {
    async fn get_ear_tag_window_days(&self) -> Result<(i64, i64), Box<dyn Error>> {
        let d = ClassifierConfig::default();
        Ok((
            self.get_parsed_or_default(config_keys::EAR_TAG_MIN_DAYS, d.ear_tag_min_days)?,
            self.get_parsed_or_default(config_keys::EAR_TAG_MAX_DAYS, d.ear_tag_max_days)?,
        ))
    }

    async fn get_weaning_window_months(&self) -> Result<(i64, i64), Box<dyn Error>> {
        let d = ClassifierConfig::default();
        Ok((
            self.get_parsed_or_default(config_keys::WEANING_MIN_MONTHS, d.weaning_min_months)?,
            self.get_parsed_or_default(config_keys::WEANING_MAX_MONTHS, d.weaning_max_months)?,
        ))
    }

    async fn get_transition_min_months(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::TRANSITION_MIN_MONTHS,
            ClassifierConfig::default().transition_min_months,
        )
    }

    async fn get_adult_months(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::ADULT_MONTHS, ClassifierConfig::default().adult_months)
    }

    async fn get_vv_window_days(&self) -> Result<(i64, i64), Box<dyn Error>> {
        let d = ClassifierConfig::default();
        Ok((
            self.get_parsed_or_default(config_keys::VV_WINDOW_START_DAYS, d.vv_window_start_days)?,
            self.get_parsed_or_default(config_keys::VV_WINDOW_END_DAYS, d.vv_window_end_days)?,
        ))
    }

    async fn get_feed_withdrawal_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::FEED_WITHDRAWAL_DAYS,
            ClassifierConfig::default().feed_withdrawal_days,
        )
    }

    async fn get_rcc_vaccine_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::RCC_VACCINE_DAYS, ClassifierConfig::default().rcc_vaccine_days)
    }

    async fn get_maternity_move_days(&self) -> Result<i64, Box<dyn Error>> {
        self.get_parsed_or_default(
            config_keys::MATERNITY_MOVE_DAYS,
            ClassifierConfig::default().maternity_move_days,
        )
    }

    async fn get_aggregate_in_pens(&self) -> Result<bool, Box<dyn Error>> {
        self.get_parsed_or_default(config_keys::AGGREGATE_IN_PENS, ClassifierConfig::default().aggregate_in_pens)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 犊牛
    pub const EAR_TAG_MIN_DAYS: &str = "ear_tag_min_days";
    pub const EAR_TAG_MAX_DAYS: &str = "ear_tag_max_days";
    pub const WEANING_MIN_MONTHS: &str = "weaning_min_months";
    pub const WEANING_MAX_MONTHS: &str = "weaning_max_months";

    // 转群
    pub const TRANSITION_MIN_MONTHS: &str = "transition_min_months";
    pub const ADULT_MONTHS: &str = "adult_months";

    // 繁殖
    pub const VV_WINDOW_START_DAYS: &str = "vv_window_start_days";
    pub const VV_WINDOW_END_DAYS: &str = "vv_window_end_days";
    pub const FEED_WITHDRAWAL_DAYS: &str = "feed_withdrawal_days";
    pub const RCC_VACCINE_DAYS: &str = "rcc_vaccine_days";
    pub const MATERNITY_MOVE_DAYS: &str = "maternity_move_days";

    // 展示
    pub const AGGREGATE_IN_PENS: &str = "aggregate_in_pens";
}
