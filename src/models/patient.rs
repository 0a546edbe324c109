use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub entity_id: i64,
    pub marital_status: String,
    pub occupation: Option<String>,
    pub doctor_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub entity_id: i64,
    pub marital_status: String,
    pub occupation: Option<String>,
    pub doctor_id: i64,
    pub created_by: Option<i64>,
}

/// Patient row joined with the assigned doctor's name.
#[derive(Debug, Clone)]
pub struct PatientWithDoctor {
    pub patient: Patient,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
}
