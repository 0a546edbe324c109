use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::VisitType;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub visit_id: i64,
    pub visit_type: VisitType,
    pub date_issued: DateTime<Utc>,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub visit_id: i64,
    pub visit_type: VisitType,
    pub date_issued: DateTime<Utc>,
    pub notes: String,
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionItem {
    pub id: i64,
    pub prescription_id: i64,
    pub medicine_id: i64,
    pub quantity: i64,
    pub instructions: String,
}

#[derive(Debug, Clone)]
pub struct NewPrescriptionItem {
    pub prescription_id: i64,
    pub medicine_id: i64,
    pub quantity: i64,
    pub instructions: String,
}

/// Item joined with the medicine's display name. The name is `None` when
/// the medicine row has gone missing.
#[derive(Debug, Clone)]
pub struct PrescriptionItemRow {
    pub item: PrescriptionItem,
    pub medicine_name: Option<String>,
}

/// A prescription with its items loaded, in insertion order.
#[derive(Debug, Clone)]
pub struct PrescriptionWithItems {
    pub prescription: Prescription,
    pub items: Vec<PrescriptionItemRow>,
}
