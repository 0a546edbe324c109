use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

const ENTITY_COLUMNS: &str = "id, name, address, is_active";

fn entity_from_row(row: &rusqlite::Row<'_>) -> Result<Entity, rusqlite::Error> {
    Ok(Entity {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        is_active: row.get::<_, i32>(3)? != 0,
    })
}

pub fn insert_entity(conn: &Connection, entity: &NewEntity) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO entity (name, address, created_by, updated_by) VALUES (?1, ?2, ?3, ?3)",
        params![entity.name, entity.address, entity.created_by],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_entity(conn: &Connection, id: i64) -> Result<Option<Entity>, DatabaseError> {
    let sql = format!("SELECT {ENTITY_COLUMNS} FROM entity WHERE id = ?1");
    let entity = conn
        .query_row(&sql, params![id], entity_from_row)
        .optional()?;
    Ok(entity)
}

pub fn find_entity_by_name(conn: &Connection, name: &str) -> Result<Option<Entity>, DatabaseError> {
    let sql = format!("SELECT {ENTITY_COLUMNS} FROM entity WHERE name = ?1");
    let entity = conn
        .query_row(&sql, params![name], entity_from_row)
        .optional()?;
    Ok(entity)
}

pub fn insert_user_entity(
    conn: &Connection,
    user_id: i64,
    entity_id: i64,
    created_by: Option<i64>,
) -> Result<UserEntity, DatabaseError> {
    conn.execute(
        "INSERT INTO user_entity (user_id, entity_id, created_by) VALUES (?1, ?2, ?3)",
        params![user_id, entity_id, created_by],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(UserEntity {
        id: conn.last_insert_rowid(),
        user_id,
        entity_id,
    })
}

pub fn user_entity_exists(
    conn: &Connection,
    user_id: i64,
    entity_id: i64,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_entity WHERE user_id = ?1 AND entity_id = ?2",
        params![user_id, entity_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Active entities a user belongs to, ordered by name.
pub fn get_entities_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Entity>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.name, e.address, e.is_active
         FROM entity e
         JOIN user_entity ue ON ue.entity_id = e.id
         WHERE ue.user_id = ?1 AND ue.is_active = 1 AND e.is_active = 1
         ORDER BY e.name",
    )?;
    let rows = stmt.query_map(params![user_id], entity_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
