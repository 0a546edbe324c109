use rusqlite::{params, Connection, OptionalExtension};

use super::{fmt_timestamp, parse_date, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "a.id, a.appointment_time, a.reason, a.notes, a.patient_id,
     a.employee_id, a.entity_id, a.is_active";

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: i64,
    appointment_time: String,
    reason: String,
    notes: String,
    patient_id: i64,
    employee_id: i64,
    entity_id: i64,
    is_active: i32,
}

fn appointment_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        appointment_time: row.get(1)?,
        reason: row.get(2)?,
        notes: row.get(3)?,
        patient_id: row.get(4)?,
        employee_id: row.get(5)?,
        entity_id: row.get(6)?,
        is_active: row.get(7)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: row.id,
        appointment_time: parse_timestamp("appointment_time", &row.appointment_time)?,
        reason: row.reason,
        notes: row.notes,
        patient_id: row.patient_id,
        employee_id: row.employee_id,
        entity_id: row.entity_id,
        is_active: row.is_active != 0,
    })
}

pub fn insert_appointment(conn: &Connection, appt: &NewAppointment) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointment (appointment_time, reason, notes, patient_id, employee_id,
         entity_id, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            fmt_timestamp(&appt.appointment_time),
            appt.reason,
            appt.notes,
            appt.patient_id,
            appt.employee_id,
            appt.entity_id,
            appt.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_appointment(conn: &Connection, id: i64) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointment a WHERE a.id = ?1");
    let row = conn
        .query_row(&sql, params![id], appointment_row_from_rusqlite)
        .optional()?;
    row.map(appointment_from_row).transpose()
}

/// Appointments joined with patient and doctor, earliest first.
pub fn list_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
) -> Result<Vec<AppointmentListRow>, DatabaseError> {
    let sql = format!(
        "SELECT {APPOINTMENT_COLUMNS},
                p.first_name, p.last_name, p.gender, p.date_of_birth,
                d.first_name, d.last_name
         FROM appointment a
         JOIN patient p ON p.id = a.patient_id
         JOIN employee d ON d.id = a.employee_id
         WHERE (?1 IS NULL OR a.entity_id = ?1)
           AND (?2 = 0 OR a.is_active = 1)
         ORDER BY a.appointment_time, a.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![filter.entity_id, filter.active_only], |row| {
        Ok((
            appointment_row_from_rusqlite(row)?,
            row.get::<_, String>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, String>(10)?,
            row.get::<_, String>(11)?,
            row.get::<_, String>(12)?,
            row.get::<_, String>(13)?,
        ))
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        let (appt, p_first, p_last, p_gender, p_dob, d_first, d_last) = row?;
        appointments.push(AppointmentListRow {
            appointment: appointment_from_row(appt)?,
            patient_first_name: p_first,
            patient_last_name: p_last,
            patient_gender: p_gender,
            patient_dob: parse_date("date_of_birth", &p_dob)?,
            doctor_first_name: d_first,
            doctor_last_name: d_last,
        });
    }
    Ok(appointments)
}
