use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub appointment_time: DateTime<Utc>,
    pub reason: String,
    pub notes: String,
    pub patient_id: i64,
    pub employee_id: i64,
    pub entity_id: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub appointment_time: DateTime<Utc>,
    pub reason: String,
    pub notes: String,
    pub patient_id: i64,
    pub employee_id: i64,
    pub entity_id: i64,
    pub created_by: Option<i64>,
}

/// Appointment joined with the patient and doctor columns shown in lists.
#[derive(Debug, Clone)]
pub struct AppointmentListRow {
    pub appointment: Appointment,
    pub patient_first_name: String,
    pub patient_last_name: String,
    pub patient_gender: String,
    pub patient_dob: NaiveDate,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
}
