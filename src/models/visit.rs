use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::VisitType;

/// Inpatient or outpatient encounter. Admission, discharge and room only
/// carry values for inpatient stays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub appointment_id: Option<i64>,
    pub visit_date: DateTime<Utc>,
    pub admission_date: Option<DateTime<Utc>>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub room_number: Option<String>,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub notes: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub visit_type: VisitType,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewVisit {
    pub appointment_id: Option<i64>,
    pub visit_date: DateTime<Utc>,
    pub admission_date: Option<DateTime<Utc>>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub room_number: Option<String>,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub notes: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub visit_type: VisitType,
    pub created_by: Option<i64>,
}

/// Visit joined with the treating doctor's name.
#[derive(Debug, Clone)]
pub struct VisitWithDoctor {
    pub visit: Visit,
    pub doctor_first_name: String,
    pub doctor_last_name: String,
}
