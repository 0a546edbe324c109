use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use super::{fmt_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::enums::VisitType;
use crate::models::*;

const PRESCRIPTION_COLUMNS: &str =
    "id, patient_id, doctor_id, visit_id, visit_type, date_issued, notes";

fn prescription_from_row(
    row: &rusqlite::Row<'_>,
) -> Result<(i64, i64, i64, i64, String, String, String), rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn build_prescription(
    (id, patient_id, doctor_id, visit_id, visit_type, date_issued, notes): (
        i64,
        i64,
        i64,
        i64,
        String,
        String,
        String,
    ),
) -> Result<Prescription, DatabaseError> {
    Ok(Prescription {
        id,
        patient_id,
        doctor_id,
        visit_id,
        visit_type: VisitType::from_str(&visit_type)?,
        date_issued: parse_timestamp("date_issued", &date_issued)?,
        notes,
    })
}

pub fn insert_prescription(conn: &Connection, rx: &NewPrescription) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescription (patient_id, doctor_id, visit_id, visit_type, date_issued,
         notes, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            rx.patient_id,
            rx.doctor_id,
            rx.visit_id,
            rx.visit_type.as_str(),
            fmt_timestamp(&rx.date_issued),
            rx.notes,
            rx.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_prescription_item(
    conn: &Connection,
    item: &NewPrescriptionItem,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescription_item (prescription_id, medicine_id, quantity, instructions)
         VALUES (?1, ?2, ?3, ?4)",
        params![item.prescription_id, item.medicine_id, item.quantity, item.instructions],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_prescription(conn: &Connection, id: i64) -> Result<Option<Prescription>, DatabaseError> {
    let sql = format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescription WHERE id = ?1");
    let row = conn
        .query_row(&sql, params![id], prescription_from_row)
        .optional()?;
    row.map(build_prescription).transpose()
}

/// Items of one prescription in insertion order, with the medicine name
/// when the medicine row still exists.
pub fn get_prescription_items(
    conn: &Connection,
    prescription_id: i64,
) -> Result<Vec<PrescriptionItemRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.prescription_id, i.medicine_id, i.quantity, i.instructions, m.name
         FROM prescription_item i
         LEFT JOIN medicine m ON m.id = i.medicine_id
         WHERE i.prescription_id = ?1
         ORDER BY i.id",
    )?;
    let rows = stmt.query_map(params![prescription_id], |row| {
        Ok(PrescriptionItemRow {
            item: PrescriptionItem {
                id: row.get(0)?,
                prescription_id: row.get(1)?,
                medicine_id: row.get(2)?,
                quantity: row.get(3)?,
                instructions: row.get(4)?,
            },
            medicine_name: row.get(5)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_prescription_with_items(
    conn: &Connection,
    id: i64,
) -> Result<Option<PrescriptionWithItems>, DatabaseError> {
    let Some(prescription) = get_prescription(conn, id)? else {
        return Ok(None);
    };
    let items = get_prescription_items(conn, prescription.id)?;
    Ok(Some(PrescriptionWithItems { prescription, items }))
}

/// Prescriptions attached to one visit. Both id and type must match,
/// since IP and OP visits historically lived in separate id spaces.
pub fn list_prescriptions_for_visit(
    conn: &Connection,
    visit_id: i64,
    visit_type: VisitType,
) -> Result<Vec<Prescription>, DatabaseError> {
    let sql = format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescription
         WHERE visit_id = ?1 AND visit_type = ?2
         ORDER BY date_issued DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![visit_id, visit_type.as_str()], prescription_from_row)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(build_prescription(row?)?);
    }
    Ok(out)
}

/// All prescriptions of a patient with items loaded, newest first.
pub fn list_prescriptions_for_patient(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PrescriptionWithItems>, DatabaseError> {
    let sql = format!(
        "SELECT {PRESCRIPTION_COLUMNS} FROM prescription
         WHERE patient_id = ?1
         ORDER BY date_issued DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], prescription_from_row)?;

    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(build_prescription(row?)?);
    }

    let mut out = Vec::with_capacity(prescriptions.len());
    for prescription in prescriptions {
        let items = get_prescription_items(conn, prescription.id)?;
        out.push(PrescriptionWithItems { prescription, items });
    }
    Ok(out)
}
