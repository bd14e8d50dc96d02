// ==========================================
// MooTracker 牧场管理系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use crate::api::AlertApi;
use crate::config::{ClassifierConfigReader, ConfigManager};
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::engine::sink::TaskSink;
use crate::repository::{
    AlertStateRepository, AnimalRepository, EventLogRepository, PenRepository, TaskRepository,
};

/// 应用状态
///
/// 所有仓储共享同一个连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 提醒看板API
    pub alert_api: Arc<AlertApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    pub animal_repo: Arc<AnimalRepository>,
    pub pen_repo: Arc<PenRepository>,
    pub event_log_repo: Arc<EventLogRepository>,
    pub task_repo: Arc<TaskRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时自动建库）
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接装配（连接需已完成建表）
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let animal_repo = Arc::new(AnimalRepository::from_connection(conn.clone()));
        let pen_repo = Arc::new(PenRepository::from_connection(conn.clone()));
        let event_log_repo = Arc::new(EventLogRepository::from_connection(conn.clone()));
        let task_repo = Arc::new(TaskRepository::from_connection(conn.clone()));
        let alert_state_repo = Arc::new(AlertStateRepository::from_connection(conn.clone()));

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let alert_api = Arc::new(AlertApi::new(
            animal_repo.clone(),
            pen_repo.clone(),
            alert_state_repo,
            task_repo.clone(),
            config_manager.clone() as Arc<dyn ClassifierConfigReader>,
            task_repo.clone() as Arc<dyn TaskSink>,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            alert_api,
            config_manager,
            animal_repo,
            pen_repo,
            event_log_repo,
            task_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级:
/// 1. 环境变量 MOO_TRACKER_DB_PATH
/// 2. 用户数据目录下的 moo-tracker/moo_tracker.db
/// 3. 当前目录 ./moo_tracker.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("MOO_TRACKER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./moo_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("moo-tracker");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("moo_tracker.db");
        }
    }

    path.to_string_lossy().to_string()
}
