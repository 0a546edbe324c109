//! Response assembly: internal rows to the external JSON shapes.
//!
//! Pure functions only. Names are collapsed to `"First Last"`, calendar
//! dates render as `YYYY-MM-DD`, collections are always arrays, and
//! neither audit columns nor password hashes appear in any view.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::enums::VisitType;
use crate::models::*;

pub fn display_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

pub fn format_date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d").to_string()
}

fn format_calendar_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ─── Appointments ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentView {
    pub appointment_id: i64,
    pub appointment_time: DateTime<Utc>,
    pub reason: String,
    pub notes: String,
    pub patient_firstname: String,
    pub patient_lastname: String,
    pub patient_gender: String,
    pub patient_dob: String,
    pub doctor_firstname: String,
    pub doctor_lastname: String,
    pub doctor_name: String,
}

pub fn appointment_view(row: AppointmentListRow) -> AppointmentView {
    let doctor_name = display_name(&row.doctor_first_name, &row.doctor_last_name);
    AppointmentView {
        appointment_id: row.appointment.id,
        appointment_time: row.appointment.appointment_time,
        reason: row.appointment.reason,
        notes: row.appointment.notes,
        patient_firstname: row.patient_first_name,
        patient_lastname: row.patient_last_name,
        patient_gender: row.patient_gender,
        patient_dob: format_calendar_date(&row.patient_dob),
        doctor_firstname: row.doctor_first_name,
        doctor_lastname: row.doctor_last_name,
        doctor_name,
    }
}

// ─── Visits ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionSummary {
    pub id: i64,
    pub date_issued: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitView {
    pub id: i64,
    pub appointment_id: Option<i64>,
    pub visit_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admission_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_date: Option<String>,
    pub room_number: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub notes: String,
    pub visit_type: VisitType,
    pub doctor_name: String,
    pub is_active: bool,
    pub prescriptions: Vec<PrescriptionSummary>,
}

/// Both buckets serialize as arrays even when empty.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VisitHistory {
    pub inpatient_visits: Vec<VisitView>,
    pub outpatient_visits: Vec<VisitView>,
}

pub fn prescription_summary(prescription: &Prescription) -> PrescriptionSummary {
    PrescriptionSummary {
        id: prescription.id,
        date_issued: format_date(&prescription.date_issued),
    }
}

pub fn visit_view(visit: Visit, doctor_name: String, prescriptions: &[Prescription]) -> VisitView {
    VisitView {
        id: visit.id,
        appointment_id: visit.appointment_id,
        visit_date: format_date(&visit.visit_date),
        admission_date: visit.admission_date.as_ref().map(format_date),
        discharge_date: visit.discharge_date.as_ref().map(format_date),
        room_number: visit.room_number.unwrap_or_default(),
        diagnosis: visit.diagnosis,
        treatment_plan: visit.treatment_plan,
        notes: visit.notes,
        visit_type: visit.visit_type,
        doctor_name,
        is_active: visit.is_active,
        prescriptions: prescriptions.iter().map(prescription_summary).collect(),
    }
}

/// Partition visits into inpatient and outpatient buckets, keeping order.
pub fn visit_history(visits: Vec<(VisitWithDoctor, Vec<Prescription>)>) -> VisitHistory {
    let mut history = VisitHistory::default();
    for (row, prescriptions) in visits {
        let doctor_name = display_name(&row.doctor_first_name, &row.doctor_last_name);
        let visit_type = row.visit.visit_type;
        let view = visit_view(row.visit, doctor_name, &prescriptions);
        match visit_type {
            VisitType::Inpatient => history.inpatient_visits.push(view),
            VisitType::Outpatient => history.outpatient_visits.push(view),
        }
    }
    history
}

// ─── Prescriptions ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionItemView {
    pub medicine_id: i64,
    pub medicine_name: String,
    pub quantity: i64,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrescriptionDetails {
    pub prescription_id: i64,
    pub visit_id: i64,
    pub visit_type: VisitType,
    pub date_issued: String,
    pub notes: String,
    pub items: Vec<PrescriptionItemView>,
}

pub fn prescription_details(rx: PrescriptionWithItems) -> PrescriptionDetails {
    PrescriptionDetails {
        prescription_id: rx.prescription.id,
        visit_id: rx.prescription.visit_id,
        visit_type: rx.prescription.visit_type,
        date_issued: format_date(&rx.prescription.date_issued),
        notes: rx.prescription.notes,
        items: rx
            .items
            .into_iter()
            .map(|row| PrescriptionItemView {
                medicine_id: row.item.medicine_id,
                medicine_name: row.medicine_name.unwrap_or_default(),
                quantity: row.item.quantity,
                instructions: row.item.instructions,
            })
            .collect(),
    }
}

// ─── Directory ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeListItem {
    pub id: i64,
    pub name: String,
}

pub fn employee_list_item(employee: &Employee) -> EmployeeListItem {
    EmployeeListItem {
        id: employee.id,
        name: display_name(&employee.first_name, &employee.last_name),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientDetails {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub entity_id: i64,
    pub marital_status: String,
    pub occupation: String,
    pub doctor_id: i64,
    pub is_active: bool,
}

pub fn patient_details(patient: Patient) -> PatientDetails {
    PatientDetails {
        id: patient.id,
        first_name: patient.first_name,
        last_name: patient.last_name,
        gender: patient.gender,
        date_of_birth: format_calendar_date(&patient.date_of_birth),
        contact_number: patient.contact_number,
        email: patient.email,
        address: patient.address,
        entity_id: patient.entity_id,
        marital_status: patient.marital_status,
        occupation: patient.occupation.unwrap_or_default(),
        doctor_id: patient.doctor_id,
        is_active: patient.is_active,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientListItem {
    #[serde(flatten)]
    pub patient: PatientDetails,
    pub doctor: String,
}

pub fn patient_list_item(row: PatientWithDoctor) -> PatientListItem {
    let doctor = display_name(&row.doctor_first_name, &row.doctor_last_name);
    PatientListItem {
        patient: patient_details(row.patient),
        doctor,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicineListItem {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_translations: Option<serde_json::Value>,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicineCatalogCategory {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_translations: Option<serde_json::Value>,
    pub entity_id: i64,
    pub medicines: Vec<MedicineListItem>,
}

/// Group medicines under their categories. Categories without medicines
/// keep an empty list; medicines of unknown categories are dropped.
pub fn medicine_catalog(
    categories: Vec<MedicineCategory>,
    medicines: Vec<Medicine>,
) -> Vec<MedicineCatalogCategory> {
    let mut catalog: Vec<MedicineCatalogCategory> = categories
        .into_iter()
        .map(|c| MedicineCatalogCategory {
            id: c.id,
            name: c.name,
            name_translations: c.name_translations,
            entity_id: c.entity_id,
            medicines: Vec::new(),
        })
        .collect();

    for medicine in medicines {
        if let Some(category) = catalog.iter_mut().find(|c| c.id == medicine.category_id) {
            category.medicines.push(MedicineListItem {
                id: medicine.id,
                name: medicine.name,
                name_translations: medicine.name_translations,
                price: medicine.price,
                quantity: medicine.quantity,
            });
        }
    }
    catalog
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomView {
    pub id: i64,
    pub room_number: String,
    pub room_category_id: i64,
    pub category: String,
    pub price: f64,
    pub occupied: bool,
}

pub fn room_view(row: RoomStatusRow) -> RoomView {
    RoomView {
        id: row.room.id,
        room_number: row.room.room_number,
        room_category_id: row.room.room_category_id,
        category: row.category_name,
        price: row.room.price,
        occupied: row.occupied,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub id: i64,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: i64,
    pub email: String,
    pub entities: Vec<EntitySummary>,
}

pub fn profile_view(user: &User, entities: Vec<Entity>) -> ProfileView {
    ProfileView {
        id: user.id,
        email: user.email.clone(),
        entities: entities
            .into_iter()
            .map(|e| EntitySummary {
                id: e.id,
                name: e.name,
                address: e.address,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 15, 0).unwrap()
    }

    fn visit(id: i64, visit_type: VisitType) -> Visit {
        Visit {
            id,
            appointment_id: None,
            visit_date: ts(2024, 3, 5, 9),
            admission_date: None,
            discharge_date: None,
            room_number: None,
            diagnosis: "flu".into(),
            treatment_plan: "rest".into(),
            notes: String::new(),
            patient_id: 1,
            doctor_id: 1,
            visit_type,
            is_active: true,
        }
    }

    fn prescription(id: i64, visit_id: i64) -> Prescription {
        Prescription {
            id,
            patient_id: 1,
            doctor_id: 1,
            visit_id,
            visit_type: VisitType::Outpatient,
            date_issued: ts(2024, 3, 6, 23),
            notes: String::new(),
        }
    }

    fn with_doctor(v: Visit) -> VisitWithDoctor {
        VisitWithDoctor {
            visit: v,
            doctor_first_name: "Asha".into(),
            doctor_last_name: "Rao".into(),
        }
    }

    #[test]
    fn display_name_joins_with_space() {
        assert_eq!(display_name("Asha", "Rao"), "Asha Rao");
        assert_eq!(display_name("", ""), "");
    }

    #[test]
    fn dates_render_as_calendar_days() {
        assert_eq!(format_date(&ts(2024, 12, 31, 23)), "2024-12-31");
    }

    #[test]
    fn empty_history_serializes_two_arrays() {
        let json = serde_json::to_value(visit_history(Vec::new())).unwrap();
        assert_eq!(json["inpatient_visits"], serde_json::json!([]));
        assert_eq!(json["outpatient_visits"], serde_json::json!([]));
    }

    #[test]
    fn history_partitions_by_visit_type() {
        let history = visit_history(vec![
            (with_doctor(visit(1, VisitType::Inpatient)), Vec::new()),
            (with_doctor(visit(2, VisitType::Outpatient)), vec![prescription(7, 2)]),
            (with_doctor(visit(3, VisitType::Outpatient)), Vec::new()),
        ]);
        assert_eq!(history.inpatient_visits.len(), 1);
        assert_eq!(history.outpatient_visits.len(), 2);
        assert_eq!(history.outpatient_visits[0].doctor_name, "Asha Rao");
        assert_eq!(
            history.outpatient_visits[0].prescriptions,
            vec![PrescriptionSummary {
                id: 7,
                date_issued: "2024-03-06".into()
            }]
        );

        let json = serde_json::to_value(&history.outpatient_visits[1]).unwrap();
        assert_eq!(json["prescriptions"], serde_json::json!([]));
        assert_eq!(json["visit_type"], "OP");
        assert!(json.get("discharge_date").is_none());
    }

    #[test]
    fn prescription_details_flatten_items() {
        let details = prescription_details(PrescriptionWithItems {
            prescription: prescription(1, 1),
            items: vec![
                PrescriptionItemRow {
                    item: PrescriptionItem {
                        id: 1,
                        prescription_id: 1,
                        medicine_id: 5,
                        quantity: 2,
                        instructions: "twice daily".into(),
                    },
                    medicine_name: Some("Paracetamol".into()),
                },
                PrescriptionItemRow {
                    item: PrescriptionItem {
                        id: 2,
                        prescription_id: 1,
                        medicine_id: 6,
                        quantity: 1,
                        instructions: String::new(),
                    },
                    medicine_name: None,
                },
            ],
        });

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["prescription_id"], 1);
        assert_eq!(json["date_issued"], "2024-03-06");
        assert_eq!(json["items"][0]["medicine_name"], "Paracetamol");
        assert_eq!(json["items"][0]["quantity"], 2);
        assert_eq!(json["items"][1]["medicine_name"], "");
    }

    #[test]
    fn catalog_groups_medicines_and_keeps_empty_categories() {
        let category = |id: i64, name: &str| MedicineCategory {
            id,
            name: name.into(),
            name_translations: None,
            description: String::new(),
            entity_id: 1,
            is_active: true,
        };
        let medicine = Medicine {
            id: 10,
            name: "Ibuprofen".into(),
            name_translations: Some(serde_json::json!({"fr": "Ibuprofène"})),
            category_id: 2,
            entity_id: 1,
            description: String::new(),
            price: 3.0,
            quantity: 20,
            is_active: true,
        };

        let catalog = medicine_catalog(vec![category(1, "Antibiotics"), category(2, "Analgesics")], vec![medicine]);
        assert!(catalog[0].medicines.is_empty());
        assert_eq!(catalog[1].medicines[0].name, "Ibuprofen");

        let json = serde_json::to_value(&catalog[0]).unwrap();
        assert_eq!(json["medicines"], serde_json::json!([]));
    }

    #[test]
    fn user_view_never_carries_password_hash() {
        let user = User {
            id: 3,
            email: "a@b.test".into(),
            password_hash: "pbkdf2$...".into(),
            is_active: true,
        };
        let json = serde_json::to_value(profile_view(&user, Vec::new())).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["entities"], serde_json::json!([]));
        assert!(serde_json::to_value(&user).unwrap().get("password_hash").is_none());
    }
}
