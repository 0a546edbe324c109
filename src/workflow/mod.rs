//! Clinical record workflows.
//!
//! Every operation takes a borrowed `rusqlite::Connection` and returns
//! `Result<_, WorkflowError>`. Reference checks run first and the first
//! failure wins; nothing is written before all checks pass. Read paths
//! hand their rows to `assembler` for the external JSON shape.

pub mod assembler;
pub mod directory;
pub mod error;
pub mod prescription;
pub mod reference;
pub mod visit;

pub use error::WorkflowError;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Parse a `YYYY-MM-DD` request field into a date.
pub(crate) fn parse_request_date(field: &str, value: &str) -> Result<NaiveDate, WorkflowError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        WorkflowError::Validation(format!("Invalid {field} format (expected YYYY-MM-DD)"))
    })
}

/// Midnight UTC of a calendar date.
pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Distinguish an explicit `null` from an absent field: used with
/// `#[serde(default)]` on `Option<Option<T>>`, absent stays `None` and
/// `null` becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Seed data shared by workflow tests.

    use chrono::NaiveDate;
    use rusqlite::Connection;

    use crate::db::{self, open_memory_database};
    use crate::models::*;

    pub struct Seed {
        pub conn: Connection,
        pub entity_id: i64,
        pub doctor_id: i64,
        pub patient_id: i64,
        pub category_id: i64,
        pub medicine_ids: Vec<i64>,
    }

    pub fn new_doctor(entity_id: i64, email: &str) -> NewEmployee {
        NewEmployee {
            first_name: "Asha".into(),
            last_name: "Rao".into(),
            email: email.into(),
            phone_number: "555-0100".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 2).unwrap(),
            entity_id,
            employee_category_id: 1,
            created_by: None,
        }
    }

    pub fn new_patient(entity_id: i64, doctor_id: i64, email: &str) -> NewPatient {
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
            occupation: Some("teacher".into()),
            doctor_id,
            created_by: None,
        }
    }

    /// One entity with a doctor, a patient and `medicines` catalog entries.
    pub fn seed(medicines: usize) -> Seed {
        let conn = open_memory_database().unwrap();
        let entity_id = db::insert_entity(
            &conn,
            &NewEntity {
                name: "City Hospital".into(),
                address: "123 Main St".into(),
                created_by: None,
            },
        )
        .unwrap();
        let doctor_id = db::insert_employee(&conn, &new_doctor(entity_id, "doc@x.com")).unwrap();
        let patient_id =
            db::insert_patient(&conn, &new_patient(entity_id, doctor_id, "pat@x.com")).unwrap();
        let category_id = db::insert_medicine_category(
            &conn,
            &NewMedicineCategory {
                name: "Analgesics".into(),
                name_translations: None,
                description: String::new(),
                entity_id,
                created_by: None,
            },
        )
        .unwrap();

        let medicine_ids = (1..=medicines)
            .map(|n| {
                db::insert_medicine(
                    &conn,
                    &NewMedicine {
                        name: format!("Medicine {n}"),
                        name_translations: None,
                        category_id,
                        entity_id,
                        description: String::new(),
                        price: 1.5,
                        quantity: 100,
                        created_by: None,
                    },
                )
                .unwrap()
            })
            .collect();

        Seed {
            conn,
            entity_id,
            doctor_id,
            patient_id,
            category_id,
            medicine_ids,
        }
    }
}
