// ==========================================
// MooTracker 牧场管理系统 - 牛只数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: current_pen_id 是圈舍归属的唯一权威来源
// ==========================================

use crate::domain::animal::AnimalSnapshot;
use crate::domain::types::{AnimalCategory, AnimalStatus, PregnancyStatus, Sex};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::event_log_repo::{insert_entry, load_for_animal, load_grouped};
use crate::repository::row::{format_date, parse_enum, parse_opt_date};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, enar, birth_date, sex, category, status,
        mother_id, current_pen_id, pregnancy_status,
        pairing_date, vv_date, expected_birth_date, weaning_date
    FROM animal
"#;

/// 繁殖字段更新
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PregnancyUpdate {
    pub pregnancy_status: Option<PregnancyStatus>,
    pub pairing_date: Option<NaiveDate>,
    pub vv_date: Option<NaiveDate>,
    pub expected_birth_date: Option<NaiveDate>,
}

// ==========================================
// AnimalRepository - 牛只仓储
// ==========================================
/// 牛只仓储
/// 职责: 管理 animal 表,读取时附带事件日志
pub struct AnimalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AnimalRepository {
    /// 创建新的 AnimalRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增牛只（连同快照中的事件日志,同一事务）
    pub fn insert(&self, animal: &AnimalSnapshot) -> RepositoryResult<()> {
        if animal.id.trim().is_empty() {
            return Err(RepositoryError::ValidationError("牛只ID不能为空".to_string()));
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            r#"
            INSERT INTO animal (
                id, enar, birth_date, sex, category, status,
                mother_id, current_pen_id, pregnancy_status,
                pairing_date, vv_date, expected_birth_date, weaning_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                animal.id,
                animal.enar,
                animal.birth_date.map(format_date),
                animal.sex.to_db_str(),
                animal.category.to_db_str(),
                animal.status.to_db_str(),
                animal.mother_id,
                animal.current_pen_id,
                animal.pregnancy_status.map(|s| s.to_db_str()),
                animal.pairing_date.map(format_date),
                animal.vv_date.map(format_date),
                animal.expected_birth_date.map(format_date),
                animal.weaning_date.map(format_date),
            ],
        )?;
        for entry in &animal.last_event_log {
            insert_entry(&tx, &animal.id, entry)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// 按ID查询
    ///
    /// # 返回
    /// - Ok(Some(AnimalSnapshot)): 找到（含事件日志）
    /// - Ok(None): 未找到
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<AnimalSnapshot>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let animal = conn
            .query_row(&sql, params![id], map_animal)
            .optional()?;

        match animal {
            Some(mut animal) => {
                animal.last_event_log = load_for_animal(&conn, &animal.id)?;
                Ok(Some(animal))
            }
            None => Ok(None),
        }
    }

    /// 查询在群牛只（status = ACTIVE,按ID升序）
    pub fn list_active(&self) -> RepositoryResult<Vec<AnimalSnapshot>> {
        self.list_where("WHERE status = 'ACTIVE'")
    }

    /// 查询全部牛只（按ID升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<AnimalSnapshot>> {
        self.list_where("")
    }

    fn list_where(&self, filter: &str) -> RepositoryResult<Vec<AnimalSnapshot>> {
        let conn = self.get_conn()?;
        let sql = format!("{} {} ORDER BY id", SELECT_COLUMNS, filter);
        let mut stmt = conn.prepare(&sql)?;
        let mut animals = stmt
            .query_map([], map_animal)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut logs = load_grouped(&conn)?;
        for animal in animals.iter_mut() {
            animal.last_event_log = logs.remove(&animal.id).unwrap_or_default();
        }
        Ok(animals)
    }

    /// 更新牛只状态（出售/死亡/隔离/恢复）
    pub fn update_status(&self, id: &str, status: AnimalStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE animal SET status = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![status.to_db_str(), id],
        )?;
        ensure_found(affected, id)
    }

    /// 调整圈舍（None 表示移出圈舍）
    pub fn assign_pen(&self, id: &str, pen_id: Option<&str>) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE animal SET current_pen_id = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![pen_id, id],
        )?;
        ensure_found(affected, id)
    }

    /// 更新繁殖字段（整体覆盖）
    pub fn update_pregnancy(&self, id: &str, update: &PregnancyUpdate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE animal SET
                pregnancy_status = ?1,
                pairing_date = ?2,
                vv_date = ?3,
                expected_birth_date = ?4,
                updated_at = datetime('now')
            WHERE id = ?5
            "#,
            params![
                update.pregnancy_status.map(|s| s.to_db_str()),
                update.pairing_date.map(format_date),
                update.vv_date.map(format_date),
                update.expected_birth_date.map(format_date),
                id,
            ],
        )?;
        ensure_found(affected, id)
    }
}

fn ensure_found(affected: usize, id: &str) -> RepositoryResult<()> {
    if affected == 0 {
        return Err(RepositoryError::not_found("Animal", id));
    }
    Ok(())
}

fn map_animal(row: &rusqlite::Row<'_>) -> SqliteResult<AnimalSnapshot> {
    Ok(AnimalSnapshot {
        id: row.get(0)?,
        enar: row.get(1)?,
        birth_date: parse_opt_date(2, row.get(2)?)?,
        sex: parse_enum(3, &row.get::<_, String>(3)?, Sex::from_db_str)?,
        category: parse_enum(4, &row.get::<_, String>(4)?, AnimalCategory::from_db_str)?,
        status: parse_enum(5, &row.get::<_, String>(5)?, AnimalStatus::from_db_str)?,
        mother_id: row.get(6)?,
        current_pen_id: row.get(7)?,
        pregnancy_status: row
            .get::<_, Option<String>>(8)?
            .map(|s| parse_enum(8, &s, PregnancyStatus::from_db_str))
            .transpose()?,
        pairing_date: parse_opt_date(9, row.get(9)?)?,
        vv_date: parse_opt_date(10, row.get(10)?)?,
        expected_birth_date: parse_opt_date(11, row.get(11)?)?,
        weaning_date: parse_opt_date(12, row.get(12)?)?,
        last_event_log: Vec::new(),
    })
}
