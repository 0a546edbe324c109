use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use super::{fmt_timestamp, parse_optional_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::VisitType;
use crate::models::*;

const VISIT_COLUMNS: &str = "v.id, v.appointment_id, v.visit_date, v.admission_date,
     v.discharge_date, v.room_number, v.diagnosis, v.treatment_plan, v.notes, v.patient_id,
     v.doctor_id, v.visit_type, v.is_active";

// Internal row type for Visit mapping
struct VisitRow {
    id: i64,
    appointment_id: Option<i64>,
    visit_date: String,
    admission_date: Option<String>,
    discharge_date: Option<String>,
    room_number: Option<String>,
    diagnosis: String,
    treatment_plan: String,
    notes: String,
    patient_id: i64,
    doctor_id: i64,
    visit_type: String,
    is_active: i32,
}

fn visit_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<VisitRow, rusqlite::Error> {
    Ok(VisitRow {
        id: row.get(0)?,
        appointment_id: row.get(1)?,
        visit_date: row.get(2)?,
        admission_date: row.get(3)?,
        discharge_date: row.get(4)?,
        room_number: row.get(5)?,
        diagnosis: row.get(6)?,
        treatment_plan: row.get(7)?,
        notes: row.get(8)?,
        patient_id: row.get(9)?,
        doctor_id: row.get(10)?,
        visit_type: row.get(11)?,
        is_active: row.get(12)?,
    })
}

fn visit_from_row(row: VisitRow) -> Result<Visit, DatabaseError> {
    Ok(Visit {
        id: row.id,
        appointment_id: row.appointment_id,
        visit_date: parse_timestamp("visit_date", &row.visit_date)?,
        admission_date: parse_optional_timestamp("admission_date", row.admission_date)?,
        discharge_date: parse_optional_timestamp("discharge_date", row.discharge_date)?,
        room_number: row.room_number,
        diagnosis: row.diagnosis,
        treatment_plan: row.treatment_plan,
        notes: row.notes,
        patient_id: row.patient_id,
        doctor_id: row.doctor_id,
        visit_type: VisitType::from_str(&row.visit_type)?,
        is_active: row.is_active != 0,
    })
}

pub fn insert_visit(conn: &Connection, visit: &NewVisit) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO visit (appointment_id, visit_date, admission_date, discharge_date,
         room_number, diagnosis, treatment_plan, notes, patient_id, doctor_id, visit_type,
         created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            visit.appointment_id,
            fmt_timestamp(&visit.visit_date),
            visit.admission_date.as_ref().map(fmt_timestamp),
            visit.discharge_date.as_ref().map(fmt_timestamp),
            visit.room_number,
            visit.diagnosis,
            visit.treatment_plan,
            visit.notes,
            visit.patient_id,
            visit.doctor_id,
            visit.visit_type.as_str(),
            visit.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_visit(conn: &Connection, id: i64) -> Result<Option<Visit>, DatabaseError> {
    let sql = format!("SELECT {VISIT_COLUMNS} FROM visit v WHERE v.id = ?1");
    let row = conn
        .query_row(&sql, params![id], visit_row_from_rusqlite)
        .optional()?;
    row.map(visit_from_row).transpose()
}

/// Every visit of a patient with the treating doctor's name, newest first.
/// Visits whose doctor row is missing still appear, with empty names.
pub fn list_visits_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<VisitWithDoctor>, DatabaseError> {
    let sql = format!(
        "SELECT {VISIT_COLUMNS}, COALESCE(d.first_name, ''), COALESCE(d.last_name, '')
         FROM visit v
         LEFT JOIN employee d ON d.id = v.doctor_id
         WHERE v.patient_id = ?1
         ORDER BY v.visit_date DESC, v.id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], |row| {
        Ok((
            visit_row_from_rusqlite(row)?,
            row.get::<_, String>(13)?,
            row.get::<_, String>(14)?,
        ))
    })?;

    let mut visits = Vec::new();
    for row in rows {
        let (visit_row, doctor_first_name, doctor_last_name) = row?;
        visits.push(VisitWithDoctor {
            visit: visit_from_row(visit_row)?,
            doctor_first_name,
            doctor_last_name,
        });
    }
    Ok(visits)
}
