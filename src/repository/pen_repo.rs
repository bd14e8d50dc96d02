// ==========================================
// MooTracker 牧场管理系统 - 圈舍数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 在圈牛只由 animal.current_pen_id 反查得到,
//       pen 表本身不保存成员列表
// ==========================================

use crate::domain::pen::PenSnapshot;
use crate::domain::types::{PenFunction, PenType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row::parse_enum;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// PenRepository - 圈舍仓储
// ==========================================
pub struct PenRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PenRepository {
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

    /// 新增圈舍（occupant_ids 忽略,成员以牛只的 current_pen_id 为准）
    pub fn insert(&self, pen: &PenSnapshot) -> RepositoryResult<()> {
        if pen.capacity == 0 {
            return Err(RepositoryError::FieldValueError {
                field: "capacity".to_string(),
                message: format!("圈舍 {} 容量必须大于0", pen.id),
            });
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO pen (id, number, pen_type, capacity, current_function)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                pen.id,
                pen.number,
                pen.pen_type.to_db_str(),
                pen.capacity,
                pen.current_function.to_db_str(),
            ],
        )?;
        Ok(())
    }

    /// 按ID查询（含在圈牛只）
    pub fn find_by_id(&self, id: &str) -> RepositoryResult<Option<PenSnapshot>> {
        let conn = self.get_conn()?;
        let pen = conn
            .query_row(
                "SELECT id, number, pen_type, capacity, current_function FROM pen WHERE id = ?1",
                params![id],
                map_pen,
            )
            .optional()?;

        match pen {
            Some(mut pen) => {
                let mut occupants = load_occupants(&conn)?;
                pen.occupant_ids = occupants.remove(&pen.id).unwrap_or_default();
                Ok(Some(pen))
            }
            None => Ok(None),
        }
    }

    /// 查询全部圈舍（按ID升序,含在圈牛只）
    pub fn list_all(&self) -> RepositoryResult<Vec<PenSnapshot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, number, pen_type, capacity, current_function FROM pen ORDER BY id",
        )?;
        let mut pens = stmt
            .query_map([], map_pen)?
            .collect::<SqliteResult<Vec<_>>>()?;

        let mut occupants = load_occupants(&conn)?;
        for pen in pens.iter_mut() {
            pen.occupant_ids = occupants.remove(&pen.id).unwrap_or_default();
        }
        Ok(pens)
    }

    /// 调整圈舍功能
    pub fn update_function(&self, id: &str, function: PenFunction) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE pen SET current_function = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![function.to_db_str(), id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Pen", id));
        }
        Ok(())
    }
}

/// 在场牛只（未出售、未死亡）按圈舍分组
fn load_occupants(conn: &Connection) -> SqliteResult<HashMap<String, BTreeSet<String>>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT current_pen_id, id
        FROM animal
        WHERE current_pen_id IS NOT NULL
          AND status NOT IN ('SOLD', 'DECEASED')
        "#,
    )?;

    let mut grouped: HashMap<String, BTreeSet<String>> = HashMap::new();
    let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
    for row in rows {
        let (pen_id, animal_id) = row?;
        grouped.entry(pen_id).or_default().insert(animal_id);
    }
    Ok(grouped)
}

fn map_pen(row: &rusqlite::Row<'_>) -> SqliteResult<PenSnapshot> {
    Ok(PenSnapshot {
        id: row.get(0)?,
        number: row.get(1)?,
        pen_type: parse_enum(2, &row.get::<_, String>(2)?, PenType::from_db_str)?,
        capacity: row.get(3)?,
        occupant_ids: BTreeSet::new(),
        current_function: parse_enum(4, &row.get::<_, String>(4)?, PenFunction::from_db_str)?,
    })
}
