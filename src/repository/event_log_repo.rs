// ==========================================
// MooTracker 牧场管理系统 - 事件日志仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 事件日志只追加,不修改
// ==========================================

use crate::domain::animal::EventLogEntry;
use crate::domain::types::EventTag;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{format_date, parse_date, parse_enum};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// EventLogRepository - 事件日志仓储
// ==========================================
pub struct EventLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EventLogRepository {
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

    /// 追加一条事件记录
    ///
    /// # 返回
    /// - Ok(log_id): 新记录的自增ID
    /// - Err(ForeignKeyViolation): 牛只不存在
    pub fn append(&self, animal_id: &str, entry: &EventLogEntry) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        insert_entry(&conn, animal_id, entry)?;
        Ok(conn.last_insert_rowid())
    }

    /// 查询牛只的全部事件（按日期升序）
    pub fn list_for_animal(&self, animal_id: &str) -> RepositoryResult<Vec<EventLogEntry>> {
        let conn = self.get_conn()?;
        Ok(load_for_animal(&conn, animal_id)?)
    }
}

// ==========================================
// 供 AnimalRepository 复用的连接级函数
// ==========================================

pub(crate) fn insert_entry(conn: &Connection, animal_id: &str, entry: &EventLogEntry) -> SqliteResult<usize> {
    conn.execute(
        r#"
        INSERT INTO animal_event_log (animal_id, tag, event_date, note)
        VALUES (?1, ?2, ?3, ?4)
        "#,
        params![
            animal_id,
            entry.tag.to_db_str(),
            format_date(entry.date),
            entry.note,
        ],
    )
}

pub(crate) fn load_for_animal(conn: &Connection, animal_id: &str) -> SqliteResult<Vec<EventLogEntry>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT tag, event_date, note
        FROM animal_event_log
        WHERE animal_id = ?1
        ORDER BY event_date, log_id
        "#,
    )?;
    let entries = stmt
        .query_map(params![animal_id], map_entry)?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(entries)
}

/// 按牛只分组加载事件日志
pub(crate) fn load_grouped(conn: &Connection) -> SqliteResult<HashMap<String, Vec<EventLogEntry>>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT animal_id, tag, event_date, note
        FROM animal_event_log
        ORDER BY animal_id, event_date, log_id
        "#,
    )?;

    let mut grouped: HashMap<String, Vec<EventLogEntry>> = HashMap::new();
    let rows = stmt.query_map([], |row| {
        let animal_id: String = row.get(0)?;
        let entry = EventLogEntry {
            tag: parse_enum(1, &row.get::<_, String>(1)?, EventTag::from_db_str)?,
            date: parse_date(2, &row.get::<_, String>(2)?)?,
            note: row.get(3)?,
        };
        Ok((animal_id, entry))
    })?;
    for row in rows {
        let (animal_id, entry) = row?;
        grouped.entry(animal_id).or_default().push(entry);
    }
    Ok(grouped)
}

fn map_entry(row: &rusqlite::Row<'_>) -> SqliteResult<EventLogEntry> {
    Ok(EventLogEntry {
        tag: parse_enum(0, &row.get::<_, String>(0)?, EventTag::from_db_str)?,
        date: parse_date(1, &row.get::<_, String>(1)?)?,
        note: row.get(2)?,
    })
}
