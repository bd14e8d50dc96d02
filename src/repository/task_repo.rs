// ==========================================
// MooTracker 牧场管理系统 - 任务数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 实现 engine::sink::TaskSink,提醒转任务时落库
// ==========================================

use crate::domain::alert::Alert;
use crate::domain::task::{Task, TaskId, TaskOverrides};
use crate::domain::types::{AlertPriority, AlertType, SubjectType, TaskStatus};
use crate::engine::sink::TaskSink;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{format_date, format_datetime, now, parse_date, parse_datetime, parse_enum};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    SELECT
        task_id, alert_id, alert_type, subject_type, subject_id,
        title, due_date, priority, notes, status, created_at, updated_at
    FROM task
"#;

// ==========================================
// TaskRepository - 任务仓储
// ==========================================
pub struct TaskRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TaskRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入任务
    pub fn insert(&self, task: &Task) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO task (
                task_id, alert_id, alert_type, subject_type, subject_id,
                title, due_date, priority, notes, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                task.task_id,
                task.alert_id,
                task.alert_type.as_str(),
                task.subject_type.to_db_str(),
                task.subject_id,
                task.title,
                format_date(task.due_date),
                task.priority.to_db_str(),
                task.notes,
                task.status.to_db_str(),
                format_datetime(task.created_at),
                format_datetime(task.updated_at),
            ],
        )?;
        Ok(())
    }

    /// 由提醒生成任务（覆写项优先）
    pub fn create_task(&self, alert: &Alert, overrides: TaskOverrides) -> RepositoryResult<Task> {
        let ts = now();
        let task = Task {
            task_id: Uuid::new_v4().to_string(),
            alert_id: alert.id.clone(),
            alert_type: alert.alert_type,
            subject_type: alert.subject_type,
            subject_id: alert.subject_id.clone(),
            title: overrides
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| alert.message.clone()),
            due_date: overrides.due_date.unwrap_or(alert.due_date),
            priority: overrides.priority.unwrap_or(alert.priority),
            notes: overrides.notes,
            status: TaskStatus::Open,
            created_at: ts,
            updated_at: ts,
        };
        self.insert(&task)?;
        info!(task_id = %task.task_id, alert_id = %task.alert_id, "任务已创建");
        Ok(task)
    }

    pub fn find_by_id(&self, task_id: &str) -> RepositoryResult<Option<Task>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE task_id = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![task_id], map_task).optional()?)
    }

    /// 查询未完成任务（到期日升序）
    pub fn list_open(&self) -> RepositoryResult<Vec<Task>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE status = 'OPEN' ORDER BY due_date, created_at, task_id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let tasks = stmt
            .query_map([], map_task)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(tasks)
    }

    /// 更新任务状态
    ///
    /// 只有 OPEN 任务可以完成或取消
    pub fn update_status(&self, task_id: &str, status: TaskStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let current: Option<String> = conn
            .query_row(
                "SELECT status FROM task WHERE task_id = ?1",
                params![task_id],
                |row| row.get(0),
            )
            .optional()?;

        let current = current.ok_or_else(|| RepositoryError::not_found("Task", task_id))?;
        if current != TaskStatus::Open.to_db_str() {
            return Err(RepositoryError::InvalidStateTransition {
                from: current,
                to: status.to_db_str().to_string(),
            });
        }

        conn.execute(
            "UPDATE task SET status = ?1, updated_at = ?2 WHERE task_id = ?3",
            params![status.to_db_str(), format_datetime(now()), task_id],
        )?;
        Ok(())
    }
}

// ==========================================
// TaskSink 实现
// ==========================================
impl TaskSink for TaskRepository {
    fn create_from_alert(
        &self,
        alert: &Alert,
        overrides: TaskOverrides,
    ) -> Result<TaskId, Box<dyn Error + Send + Sync>> {
        let task = self.create_task(alert, overrides)?;
        Ok(task.task_id)
    }
}

fn map_task(row: &rusqlite::Row<'_>) -> SqliteResult<Task> {
    Ok(Task {
        task_id: row.get(0)?,
        alert_id: row.get(1)?,
        alert_type: parse_enum(2, &row.get::<_, String>(2)?, AlertType::parse)?,
        subject_type: parse_enum(3, &row.get::<_, String>(3)?, SubjectType::from_db_str)?,
        subject_id: row.get(4)?,
        title: row.get(5)?,
        due_date: parse_date(6, &row.get::<_, String>(6)?)?,
        priority: parse_enum(7, &row.get::<_, String>(7)?, AlertPriority::from_db_str)?,
        notes: row.get(8)?,
        status: parse_enum(9, &row.get::<_, String>(9)?, TaskStatus::from_db_str)?,
        created_at: parse_datetime(10, &row.get::<_, String>(10)?)?,
        updated_at: parse_datetime(11, &row.get::<_, String>(11)?)?,
    })
}
