// ==========================================
// MooTracker 牧场管理系统 - 提醒状态仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 每个提醒ID至多一条状态（暂缓 或 已处理）,后写覆盖先写
// ==========================================

use crate::domain::alert::AlertState;
use crate::domain::types::AlertStateKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::{format_date, format_datetime, now, parse_datetime, parse_enum, parse_opt_date};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// AlertStateRepository - 提醒状态仓储
// ==========================================
pub struct AlertStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AlertStateRepository {
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

    /// 暂缓提醒至 `until`（当天起重新显示）
    pub fn snooze(&self, alert_id: &str, until: NaiveDate, actor: &str) -> RepositoryResult<AlertState> {
        let state = AlertState {
            alert_id: alert_id.to_string(),
            state: AlertStateKind::Snoozed,
            snoozed_until: Some(until),
            resolved_due_date: None,
            updated_by: actor.to_string(),
            updated_at: now(),
        };
        self.upsert(&state)?;
        Ok(state)
    }

    /// 标记提醒已处理（仅对同一到期日的提醒生效）
    pub fn resolve(&self, alert_id: &str, due_date: NaiveDate, actor: &str) -> RepositoryResult<AlertState> {
        let state = AlertState {
            alert_id: alert_id.to_string(),
            state: AlertStateKind::Resolved,
            snoozed_until: None,
            resolved_due_date: Some(due_date),
            updated_by: actor.to_string(),
            updated_at: now(),
        };
        self.upsert(&state)?;
        Ok(state)
    }

    /// 清除提醒状态
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 原本就没有状态
    pub fn clear(&self, alert_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM alert_state WHERE alert_id = ?1", params![alert_id])?;
        Ok(affected > 0)
    }

    pub fn find_by_id(&self, alert_id: &str) -> RepositoryResult<Option<AlertState>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                r#"
                SELECT alert_id, state, snoozed_until, resolved_due_date, updated_by, updated_at
                FROM alert_state
                WHERE alert_id = ?1
                "#,
                params![alert_id],
                map_state,
            )
            .optional()?)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<AlertState>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT alert_id, state, snoozed_until, resolved_due_date, updated_by, updated_at
            FROM alert_state
            ORDER BY alert_id
            "#,
        )?;
        let states = stmt
            .query_map([], map_state)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(states)
    }

    fn upsert(&self, state: &AlertState) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO alert_state (alert_id, state, snoozed_until, resolved_due_date, updated_by, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(alert_id) DO UPDATE SET
                state = excluded.state,
                snoozed_until = excluded.snoozed_until,
                resolved_due_date = excluded.resolved_due_date,
                updated_by = excluded.updated_by,
                updated_at = excluded.updated_at
            "#,
            params![
                state.alert_id,
                state.state.to_db_str(),
                state.snoozed_until.map(format_date),
                state.resolved_due_date.map(format_date),
                state.updated_by,
                format_datetime(state.updated_at),
            ],
        )?;
        Ok(())
    }
}

fn map_state(row: &rusqlite::Row<'_>) -> SqliteResult<AlertState> {
    Ok(AlertState {
        alert_id: row.get(0)?,
        state: parse_enum(1, &row.get::<_, String>(1)?, AlertStateKind::from_db_str)?,
        snoozed_until: parse_opt_date(2, row.get(2)?)?,
        resolved_due_date: parse_opt_date(3, row.get(3)?)?,
        updated_by: row.get(4)?,
        updated_at: parse_datetime(5, &row.get::<_, String>(5)?)?,
    })
}
