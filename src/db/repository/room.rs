use rusqlite::{params, Connection, OptionalExtension};

use super::{fmt_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

fn room_category_from_row(row: &rusqlite::Row<'_>) -> Result<RoomCategory, rusqlite::Error> {
    Ok(RoomCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        is_active: row.get::<_, i32>(3)? != 0,
    })
}

fn room_from_row(row: &rusqlite::Row<'_>) -> Result<Room, rusqlite::Error> {
    Ok(Room {
        id: row.get(0)?,
        room_number: row.get(1)?,
        room_category_id: row.get(2)?,
        price: row.get(3)?,
        is_active: row.get::<_, i32>(4)? != 0,
    })
}

pub fn insert_room_category(conn: &Connection, category: &NewRoomCategory) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO room_category (name, price, created_by, updated_by) VALUES (?1, ?2, ?3, ?3)",
        params![category.name, category.price, category.created_by],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_room_category(conn: &Connection, id: i64) -> Result<Option<RoomCategory>, DatabaseError> {
    let category = conn
        .query_row(
            "SELECT id, name, price, is_active FROM room_category WHERE id = ?1",
            params![id],
            room_category_from_row,
        )
        .optional()?;
    Ok(category)
}

pub fn find_room_category_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<RoomCategory>, DatabaseError> {
    let category = conn
        .query_row(
            "SELECT id, name, price, is_active FROM room_category WHERE name = ?1",
            params![name],
            room_category_from_row,
        )
        .optional()?;
    Ok(category)
}

pub fn insert_room(conn: &Connection, room: &NewRoom) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO room (room_number, room_category_id, price, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![room.room_number, room.room_category_id, room.price, room.created_by],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_room(conn: &Connection, id: i64) -> Result<Option<Room>, DatabaseError> {
    let room = conn
        .query_row(
            "SELECT id, room_number, room_category_id, price, is_active FROM room WHERE id = ?1",
            params![id],
            room_from_row,
        )
        .optional()?;
    Ok(room)
}

pub fn find_room_by_number(conn: &Connection, room_number: &str) -> Result<Option<Room>, DatabaseError> {
    let room = conn
        .query_row(
            "SELECT id, room_number, room_category_id, price, is_active
             FROM room WHERE room_number = ?1",
            params![room_number],
            room_from_row,
        )
        .optional()?;
    Ok(room)
}

/// Active rooms with their category name and whether a stay is open.
pub fn list_room_status(conn: &Connection) -> Result<Vec<RoomStatusRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.room_number, r.room_category_id, r.price, r.is_active, c.name,
                EXISTS (SELECT 1 FROM room_occupancy o WHERE o.room_id = r.id AND o.is_active = 1)
         FROM room r
         JOIN room_category c ON c.id = r.room_category_id
         WHERE r.is_active = 1
         ORDER BY r.room_number",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(RoomStatusRow {
            room: room_from_row(row)?,
            category_name: row.get(5)?,
            occupied: row.get::<_, i32>(6)? != 0,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn insert_room_occupancy(
    conn: &Connection,
    occupancy: &NewRoomOccupancy,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO room_occupancy (room_id, patient_id, admit_date, price_per_day,
         created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            occupancy.room_id,
            occupancy.patient_id,
            fmt_timestamp(&occupancy.admit_date),
            occupancy.price_per_day,
            occupancy.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

// Internal row type for RoomOccupancy mapping
struct OccupancyRow {
    id: i64,
    room_id: i64,
    patient_id: Option<i64>,
    admit_date: String,
    discharge_date: Option<String>,
    price_per_day: f64,
    is_active: i32,
}

fn occupancy_from_row(row: OccupancyRow) -> Result<RoomOccupancy, DatabaseError> {
    Ok(RoomOccupancy {
        id: row.id,
        room_id: row.room_id,
        patient_id: row.patient_id,
        admit_date: parse_timestamp("admit_date", &row.admit_date)?,
        discharge_date: parse_optional_timestamp("discharge_date", row.discharge_date)?,
        price_per_day: row.price_per_day,
        is_active: row.is_active != 0,
    })
}

pub fn get_room_occupancy(conn: &Connection, id: i64) -> Result<Option<RoomOccupancy>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, room_id, patient_id, admit_date, discharge_date, price_per_day, is_active
             FROM room_occupancy WHERE id = ?1",
            params![id],
            |row| {
                Ok(OccupancyRow {
                    id: row.get(0)?,
                    room_id: row.get(1)?,
                    patient_id: row.get(2)?,
                    admit_date: row.get(3)?,
                    discharge_date: row.get(4)?,
                    price_per_day: row.get(5)?,
                    is_active: row.get(6)?,
                })
            },
        )
        .optional()?;
    row.map(occupancy_from_row).transpose()
}

pub fn room_is_occupied(conn: &Connection, room_id: i64) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM room_occupancy WHERE room_id = ?1 AND is_active = 1",
        params![room_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
