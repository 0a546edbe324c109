use rusqlite::{params, Connection, OptionalExtension};

use super::parse_json_column;
use crate::db::DatabaseError;
use crate::models::*;

const CATEGORY_COLUMNS: &str = "id, name, name_translations, description, entity_id, is_active";
const MEDICINE_COLUMNS: &str =
    "id, name, name_translations, category_id, entity_id, description, price, quantity, is_active";

fn category_from_row(row: &rusqlite::Row<'_>) -> Result<MedicineCategory, rusqlite::Error> {
    Ok(MedicineCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        name_translations: parse_json_column(row.get(2)?),
        description: row.get(3)?,
        entity_id: row.get(4)?,
        is_active: row.get::<_, i32>(5)? != 0,
    })
}

fn medicine_from_row(row: &rusqlite::Row<'_>) -> Result<Medicine, rusqlite::Error> {
    Ok(Medicine {
        id: row.get(0)?,
        name: row.get(1)?,
        name_translations: parse_json_column(row.get(2)?),
        category_id: row.get(3)?,
        entity_id: row.get(4)?,
        description: row.get(5)?,
        price: row.get(6)?,
        quantity: row.get(7)?,
        is_active: row.get::<_, i32>(8)? != 0,
    })
}

fn translations_text(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

pub fn insert_medicine_category(
    conn: &Connection,
    category: &NewMedicineCategory,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medicine_category (name, name_translations, description, entity_id,
         created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            category.name,
            translations_text(&category.name_translations),
            category.description,
            category.entity_id,
            category.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_medicine_category(
    conn: &Connection,
    id: i64,
) -> Result<Option<MedicineCategory>, DatabaseError> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM medicine_category WHERE id = ?1");
    let category = conn
        .query_row(&sql, params![id], category_from_row)
        .optional()?;
    Ok(category)
}

pub fn find_medicine_category_by_name(
    conn: &Connection,
    entity_id: i64,
    name: &str,
) -> Result<Option<MedicineCategory>, DatabaseError> {
    let sql = format!(
        "SELECT {CATEGORY_COLUMNS} FROM medicine_category WHERE entity_id = ?1 AND name = ?2"
    );
    let category = conn
        .query_row(&sql, params![entity_id, name], category_from_row)
        .optional()?;
    Ok(category)
}

pub fn list_medicine_categories(
    conn: &Connection,
    filter: &MedicineFilter,
) -> Result<Vec<MedicineCategory>, DatabaseError> {
    let sql = format!(
        "SELECT {CATEGORY_COLUMNS} FROM medicine_category
         WHERE (?1 IS NULL OR entity_id = ?1)
           AND (?2 = 0 OR is_active = 1)
         ORDER BY name, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![filter.entity_id, filter.active_only], category_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn insert_medicine(conn: &Connection, medicine: &NewMedicine) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medicine (name, name_translations, category_id, entity_id, description,
         price, quantity, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            medicine.name,
            translations_text(&medicine.name_translations),
            medicine.category_id,
            medicine.entity_id,
            medicine.description,
            medicine.price,
            medicine.quantity,
            medicine.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_medicine(conn: &Connection, id: i64) -> Result<Option<Medicine>, DatabaseError> {
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicine WHERE id = ?1");
    let medicine = conn
        .query_row(&sql, params![id], medicine_from_row)
        .optional()?;
    Ok(medicine)
}

pub fn find_medicine_by_name(
    conn: &Connection,
    entity_id: i64,
    name: &str,
) -> Result<Option<Medicine>, DatabaseError> {
    let sql = format!("SELECT {MEDICINE_COLUMNS} FROM medicine WHERE entity_id = ?1 AND name = ?2");
    let medicine = conn
        .query_row(&sql, params![entity_id, name], medicine_from_row)
        .optional()?;
    Ok(medicine)
}

pub fn list_medicines(
    conn: &Connection,
    filter: &MedicineFilter,
) -> Result<Vec<Medicine>, DatabaseError> {
    let sql = format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicine
         WHERE (?1 IS NULL OR entity_id = ?1)
           AND (?2 = 0 OR is_active = 1)
         ORDER BY name, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![filter.entity_id, filter.active_only], medicine_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}
