use rusqlite::{params, Connection, OptionalExtension};

use super::parse_date;
use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_COLUMNS: &str = "p.id, p.first_name, p.last_name, p.gender, p.date_of_birth,
     p.contact_number, p.email, p.address, p.entity_id, p.marital_status, p.occupation,
     p.doctor_id, p.is_active";

// Internal row type for Patient mapping
struct PatientRow {
    id: i64,
    first_name: String,
    last_name: String,
    gender: String,
    date_of_birth: String,
    contact_number: String,
    email: String,
    address: String,
    entity_id: i64,
    marital_status: String,
    occupation: Option<String>,
    doctor_id: i64,
    is_active: i32,
}

fn patient_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        gender: row.get(3)?,
        date_of_birth: row.get(4)?,
        contact_number: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
        entity_id: row.get(8)?,
        marital_status: row.get(9)?,
        occupation: row.get(10)?,
        doctor_id: row.get(11)?,
        is_active: row.get(12)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        gender: row.gender,
        date_of_birth: parse_date("date_of_birth", &row.date_of_birth)?,
        contact_number: row.contact_number,
        email: row.email,
        address: row.address,
        entity_id: row.entity_id,
        marital_status: row.marital_status,
        occupation: row.occupation,
        doctor_id: row.doctor_id,
        is_active: row.is_active != 0,
    })
}

pub fn insert_patient(conn: &Connection, patient: &NewPatient) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patient (first_name, last_name, gender, date_of_birth, contact_number,
         email, address, entity_id, marital_status, occupation, doctor_id, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            patient.first_name,
            patient.last_name,
            patient.gender,
            patient.date_of_birth.to_string(),
            patient.contact_number,
            patient.email,
            patient.address,
            patient.entity_id,
            patient.marital_status,
            patient.occupation,
            patient.doctor_id,
            patient.created_by,
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patient p WHERE p.id = ?1");
    let row = conn
        .query_row(&sql, params![id], patient_row_from_rusqlite)
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// Patient lookup confined to one entity. A patient of another entity reads as absent.
pub fn get_patient_in_entity(
    conn: &Connection,
    id: i64,
    entity_id: i64,
) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patient p WHERE p.id = ?1 AND p.entity_id = ?2");
    let row = conn
        .query_row(&sql, params![id, entity_id], patient_row_from_rusqlite)
        .optional()?;
    row.map(patient_from_row).transpose()
}

pub fn find_patient_by_email(conn: &Connection, email: &str) -> Result<Option<Patient>, DatabaseError> {
    let sql = format!("SELECT {PATIENT_COLUMNS} FROM patient p WHERE p.email = ?1");
    let row = conn
        .query_row(&sql, params![email], patient_row_from_rusqlite)
        .optional()?;
    row.map(patient_from_row).transpose()
}

/// Patients joined with their assigned doctor, ordered by id.
pub fn list_patients(
    conn: &Connection,
    filter: &PatientFilter,
) -> Result<Vec<PatientWithDoctor>, DatabaseError> {
    let sql = format!(
        "SELECT {PATIENT_COLUMNS}, d.first_name, d.last_name
         FROM patient p
         JOIN employee d ON d.id = p.doctor_id
         WHERE (?1 IS NULL OR p.entity_id = ?1)
           AND (?2 = 0 OR p.is_active = 1)
         ORDER BY p.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![filter.entity_id, filter.active_only], |row| {
        Ok((
            patient_row_from_rusqlite(row)?,
            row.get::<_, String>(13)?,
            row.get::<_, String>(14)?,
        ))
    })?;

    let mut patients = Vec::new();
    for row in rows {
        let (patient_row, doctor_first_name, doctor_last_name) = row?;
        patients.push(PatientWithDoctor {
            patient: patient_from_row(patient_row)?,
            doctor_first_name,
            doctor_last_name,
        });
    }
    Ok(patients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::{insert_employee, insert_entity};
    use chrono::NaiveDate;

    fn seed(conn: &Connection) -> (i64, i64) {
        let entity_id = insert_entity(
            conn,
            &NewEntity {
                name: "City Hospital".into(),
                address: "123 Main St".into(),
                created_by: None,
            },
        )
        .unwrap();
        let doctor_id = insert_employee(
            conn,
            &NewEmployee {
                first_name: "Asha".into(),
                last_name: "Rao".into(),
                email: "asha@city.test".into(),
                phone_number: "555-0100".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 2).unwrap(),
                entity_id,
                employee_category_id: 1,
                created_by: None,
            },
        )
        .unwrap();
        (entity_id, doctor_id)
    }

    fn new_patient(entity_id: i64, doctor_id: i64, email: &str) -> NewPatient {
        NewPatient {
            first_name: "Ben".into(),
            last_name: "Ortiz".into(),
            gender: "M".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
            contact_number: "555-0200".into(),
            email: email.into(),
            address: "9 Elm St".into(),
            entity_id,
            marital_status: "single".into(),
            occupation: None,
            doctor_id,
            created_by: None,
        }
    }

    #[test]
    fn insert_and_get_patient() {
        let conn = open_memory_database().unwrap();
        let (entity_id, doctor_id) = seed(&conn);
        let id = insert_patient(&conn, &new_patient(entity_id, doctor_id, "ben@x.test")).unwrap();

        let patient = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(patient.first_name, "Ben");
        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1990, 6, 15).unwrap());
        assert!(patient.is_active);
        assert!(patient.occupation.is_none());
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let (entity_id, doctor_id) = seed(&conn);
        insert_patient(&conn, &new_patient(entity_id, doctor_id, "dup@x.test")).unwrap();
        let err = insert_patient(&conn, &new_patient(entity_id, doctor_id, "dup@x.test")).unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn entity_scoped_lookup_hides_other_entities() {
        let conn = open_memory_database().unwrap();
        let (entity_id, doctor_id) = seed(&conn);
        let id = insert_patient(&conn, &new_patient(entity_id, doctor_id, "ben@x.test")).unwrap();

        assert!(get_patient_in_entity(&conn, id, entity_id).unwrap().is_some());
        assert!(get_patient_in_entity(&conn, id, entity_id + 1).unwrap().is_none());
    }

    #[test]
    fn list_filters_inactive_and_joins_doctor() {
        let conn = open_memory_database().unwrap();
        let (entity_id, doctor_id) = seed(&conn);
        insert_patient(&conn, &new_patient(entity_id, doctor_id, "a@x.test")).unwrap();
        let inactive = insert_patient(&conn, &new_patient(entity_id, doctor_id, "b@x.test")).unwrap();
        conn.execute("UPDATE patient SET is_active = 0 WHERE id = ?1", params![inactive])
            .unwrap();

        let filter = PatientFilter {
            entity_id: Some(entity_id),
            active_only: true,
        };
        let rows = list_patients(&conn, &filter).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doctor_first_name, "Asha");

        let all = list_patients(&conn, &PatientFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
    }
}
