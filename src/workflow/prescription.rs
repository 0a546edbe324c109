//! Prescription workflow.
//!
//! A prescription belongs to one patient, one doctor and one visit of a
//! given type. Items are written one statement at a time after the
//! parent row; an item whose medicine is unknown, or whose insert fails,
//! is logged and skipped while the rest of the prescription stands.

use std::str::FromStr;

use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::assembler::{self, PrescriptionDetails};
use super::reference::{resolve, resolve_active};
use super::{parse_request_date, start_of_day, WorkflowError};
use crate::db;
use crate::models::enums::VisitType;
use crate::models::*;

#[derive(Debug, Clone, Deserialize)]
pub struct PrescriptionItemInput {
    pub medicine_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatePrescriptionRequest {
    #[serde(default)]
    pub patient_id: i64,
    #[serde(default)]
    pub doctor_id: i64,
    #[serde(default)]
    pub visit_id: i64,
    #[serde(default)]
    pub visit_type: String,
    #[serde(default)]
    pub notes: String,
    /// `YYYY-MM-DD`; the prescription is dated now when absent.
    #[serde(default)]
    pub date_issued: Option<String>,
    #[serde(default)]
    pub items: Vec<PrescriptionItemInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrescriptionCreated {
    pub id: i64,
    pub items_created: usize,
    pub items_skipped: usize,
}

pub fn create_prescription(
    conn: &Connection,
    req: &CreatePrescriptionRequest,
    actor: Option<i64>,
) -> Result<PrescriptionCreated, WorkflowError> {
    if req.visit_id == 0 || req.visit_type.trim().is_empty() {
        return Err(WorkflowError::Validation(
            "Visit ID and Visit Type are required".into(),
        ));
    }
    let visit_type = VisitType::from_str(req.visit_type.trim()).map_err(|_| {
        WorkflowError::Validation("Invalid visit type. Should be 'IP' or 'OP'.".into())
    })?;

    resolve_active::<Employee>(conn, req.doctor_id).map_err(|_| {
        tracing::warn!(doctor_id = req.doctor_id, "Prescription rejected: doctor");
        WorkflowError::Validation("Invalid doctor ID".into())
    })?;
    resolve_active::<Patient>(conn, req.patient_id).map_err(|_| {
        tracing::warn!(patient_id = req.patient_id, "Prescription rejected: patient");
        WorkflowError::Validation("Invalid patient ID".into())
    })?;

    match db::get_visit(conn, req.visit_id)? {
        Some(visit) if visit.visit_type == visit_type => {
            if visit.patient_id != req.patient_id {
                tracing::warn!(
                    visit_id = req.visit_id,
                    patient_id = req.patient_id,
                    "Prescription rejected: visit belongs to another patient"
                );
                return Err(WorkflowError::Validation(
                    "Visit does not belong to the given patient".into(),
                ));
            }
        }
        _ => {
            tracing::warn!(
                visit_id = req.visit_id,
                visit_type = %visit_type,
                "Prescription rejected: visit"
            );
            return Err(WorkflowError::Validation(
                "Visit ID does not exist for the given visit type".into(),
            ));
        }
    }

    let date_issued = match req.date_issued.as_deref() {
        Some(raw) if !raw.trim().is_empty() => start_of_day(parse_request_date("date_issued", raw)?),
        _ => Utc::now(),
    };

    let prescription_id = db::insert_prescription(
        conn,
        &NewPrescription {
            patient_id: req.patient_id,
            doctor_id: req.doctor_id,
            visit_id: req.visit_id,
            visit_type,
            date_issued,
            notes: req.notes.clone(),
            created_by: actor,
        },
    )?;

    let mut items_created = 0;
    for item in &req.items {
        if resolve::<Medicine>(conn, item.medicine_id).is_err() {
            tracing::warn!(
                prescription_id,
                medicine_id = item.medicine_id,
                "Skipping prescription item: medicine not found"
            );
            continue;
        }

        let inserted = db::insert_prescription_item(
            conn,
            &NewPrescriptionItem {
                prescription_id,
                medicine_id: item.medicine_id,
                quantity: item.quantity,
                instructions: item.instructions.clone(),
            },
        );
        match inserted {
            Ok(_) => items_created += 1,
            Err(e) => tracing::error!(
                prescription_id,
                medicine_id = item.medicine_id,
                error = %e,
                "Skipping prescription item: insert failed"
            ),
        }
    }

    let created = PrescriptionCreated {
        id: prescription_id,
        items_created,
        items_skipped: req.items.len() - items_created,
    };
    tracing::info!(
        prescription_id,
        items_created = created.items_created,
        items_skipped = created.items_skipped,
        "Prescription created"
    );
    Ok(created)
}

pub fn get_prescription_details(
    conn: &Connection,
    prescription_id: i64,
) -> Result<PrescriptionDetails, WorkflowError> {
    let rx = db::get_prescription_with_items(conn, prescription_id)?
        .ok_or_else(|| WorkflowError::NotFound("Prescription not found".into()))?;
    Ok(assembler::prescription_details(rx))
}

/// Every prescription of a patient with its items, newest first.
pub fn list_patient_prescriptions(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<PrescriptionDetails>, WorkflowError> {
    let prescriptions = db::list_prescriptions_for_patient(conn, patient_id)?;
    Ok(prescriptions
        .into_iter()
        .map(assembler::prescription_details)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::fixtures::seed;
    use crate::workflow::visit::{create_visit, CreateVisitRequest};
    use rusqlite::params;

    fn prescription_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM prescription", [], |row| row.get(0))
            .unwrap()
    }

    fn open_visit(conn: &Connection, patient_id: i64, doctor_id: i64, visit_type: &str) -> i64 {
        create_visit(
            conn,
            &CreateVisitRequest {
                patient_id,
                doctor_id,
                appointment_id: None,
                visit_date: None,
                admission_date: None,
                discharge_date: None,
                room_number: None,
                diagnosis: String::new(),
                treatment_plan: String::new(),
                notes: String::new(),
                visit_type: visit_type.into(),
            },
            None,
        )
        .unwrap()
    }

    fn item(medicine_id: i64, quantity: i64, instructions: &str) -> PrescriptionItemInput {
        PrescriptionItemInput {
            medicine_id,
            quantity,
            instructions: instructions.into(),
        }
    }

    fn request(patient_id: i64, doctor_id: i64, visit_id: i64, visit_type: &str) -> CreatePrescriptionRequest {
        CreatePrescriptionRequest {
            patient_id,
            doctor_id,
            visit_id,
            visit_type: visit_type.into(),
            notes: "After meals".into(),
            ..Default::default()
        }
    }

    #[test]
    fn city_hospital_scenario() {
        let s = seed(5);
        assert_eq!((s.entity_id, s.doctor_id, s.patient_id), (1, 1, 1));
        let visit_id = open_visit(&s.conn, 1, 1, "OP");
        assert_eq!(visit_id, 1);

        let mut req = request(1, 1, 1, "OP");
        req.items = vec![item(5, 2, "twice daily")];
        let created = create_prescription(&s.conn, &req, None).unwrap();
        assert_eq!(created.id, 1);

        let details = get_prescription_details(&s.conn, 1).unwrap();
        assert_eq!(details.prescription_id, 1);
        assert_eq!(details.items.len(), 1);
        assert_eq!(details.items[0].medicine_id, 5);
        assert_eq!(details.items[0].quantity, 2);
        assert_eq!(details.items[0].instructions, "twice daily");
        assert_eq!(details.items[0].medicine_name, "Medicine 5");
    }

    #[test]
    fn two_items_round_trip() {
        let s = seed(2);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "IP");
        let mut req = request(s.patient_id, s.doctor_id, visit_id, "IP");
        req.items = vec![
            item(s.medicine_ids[0], 2, "twice daily"),
            item(s.medicine_ids[1], 10, "at night"),
        ];

        let created = create_prescription(&s.conn, &req, None).unwrap();
        assert_eq!(created.items_created, 2);
        assert_eq!(created.items_skipped, 0);

        let details = get_prescription_details(&s.conn, created.id).unwrap();
        let got: Vec<(i64, i64, &str)> = details
            .items
            .iter()
            .map(|i| (i.medicine_id, i.quantity, i.instructions.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (s.medicine_ids[0], 2, "twice daily"),
                (s.medicine_ids[1], 10, "at night")
            ]
        );
    }

    #[test]
    fn inactive_doctor_is_rejected_without_insert() {
        let s = seed(0);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        s.conn
            .execute("UPDATE employee SET is_active = 0 WHERE id = ?1", params![s.doctor_id])
            .unwrap();

        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, visit_id, "OP"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid doctor ID");
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(prescription_count(&s.conn), 0);
    }

    #[test]
    fn unknown_patient_is_rejected_without_insert() {
        let s = seed(0);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");

        let err = create_prescription(&s.conn, &request(999, s.doctor_id, visit_id, "OP"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid patient ID");
        assert_eq!(prescription_count(&s.conn), 0);
    }

    #[test]
    fn inactive_patient_is_rejected() {
        let s = seed(0);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        s.conn
            .execute("UPDATE patient SET is_active = 0 WHERE id = ?1", params![s.patient_id])
            .unwrap();

        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, visit_id, "OP"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid patient ID");
        assert_eq!(prescription_count(&s.conn), 0);
    }

    #[test]
    fn visit_type_must_match_stored_visit() {
        let s = seed(0);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");

        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, visit_id, "IP"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Visit ID does not exist for the given visit type");

        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, 500, "OP"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Visit ID does not exist for the given visit type");
        assert_eq!(prescription_count(&s.conn), 0);
    }

    #[test]
    fn visit_reference_is_required() {
        let s = seed(0);
        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, 0, "OP"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Visit ID and Visit Type are required");

        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, 1, " "), None)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));

        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, 1, "ER"), None)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn unknown_medicine_is_skipped() {
        let s = seed(1);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        let mut req = request(s.patient_id, s.doctor_id, visit_id, "OP");
        req.items = vec![item(s.medicine_ids[0], 1, "morning"), item(4242, 3, "never")];

        let created = create_prescription(&s.conn, &req, None).unwrap();
        assert_eq!(created.items_created, 1);
        assert_eq!(created.items_skipped, 1);
        assert_eq!(get_prescription_details(&s.conn, created.id).unwrap().items.len(), 1);
    }

    #[test]
    fn failed_item_insert_is_skipped() {
        let s = seed(2);
        s.conn
            .execute_batch(
                "CREATE TRIGGER reject_negative_quantity BEFORE INSERT ON prescription_item
                 WHEN NEW.quantity < 0
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        let mut req = request(s.patient_id, s.doctor_id, visit_id, "OP");
        req.items = vec![
            item(s.medicine_ids[0], 2, "morning"),
            item(s.medicine_ids[1], -1, "rejected"),
            item(s.medicine_ids[1], 4, "evening"),
        ];

        let created = create_prescription(&s.conn, &req, None).unwrap();
        assert_eq!(created.items_created, 2);
        assert_eq!(created.items_skipped, 1);
        assert_eq!(prescription_count(&s.conn), 1);

        let details = get_prescription_details(&s.conn, created.id).unwrap();
        let got: Vec<(i64, &str)> = details
            .items
            .iter()
            .map(|i| (i.quantity, i.instructions.as_str()))
            .collect();
        assert_eq!(got, vec![(2, "morning"), (4, "evening")]);
    }

    #[test]
    fn visit_of_another_patient_is_rejected() {
        let s = seed(0);
        let other = db::insert_patient(
            &s.conn,
            &crate::workflow::fixtures::new_patient(s.entity_id, s.doctor_id, "other@x.com"),
        )
        .unwrap();
        let visit_id = open_visit(&s.conn, other, s.doctor_id, "OP");

        let err = create_prescription(&s.conn, &request(s.patient_id, s.doctor_id, visit_id, "OP"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Visit does not belong to the given patient");
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(prescription_count(&s.conn), 0);
    }

    #[test]
    fn explicit_issue_date_is_kept() {
        let s = seed(0);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        let mut req = request(s.patient_id, s.doctor_id, visit_id, "OP");
        req.date_issued = Some("2023-11-30".into());

        let created = create_prescription(&s.conn, &req, None).unwrap();
        assert_eq!(get_prescription_details(&s.conn, created.id).unwrap().date_issued, "2023-11-30");
    }

    #[test]
    fn malformed_issue_date_is_validation() {
        let s = seed(0);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        let mut req = request(s.patient_id, s.doctor_id, visit_id, "OP");
        req.date_issued = Some("30/11/2023".into());

        let err = create_prescription(&s.conn, &req, None).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(prescription_count(&s.conn), 0);
    }

    #[test]
    fn missing_prescription_is_not_found() {
        let s = seed(0);
        let err = get_prescription_details(&s.conn, 9).unwrap_err();
        assert_eq!(err.to_string(), "Prescription not found");
    }

    #[test]
    fn patient_prescriptions_newest_first() {
        let s = seed(1);
        let visit_id = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        for date in ["2024-01-10", "2024-02-10"] {
            let mut req = request(s.patient_id, s.doctor_id, visit_id, "OP");
            req.date_issued = Some(date.into());
            req.items = vec![item(s.medicine_ids[0], 1, "")];
            create_prescription(&s.conn, &req, None).unwrap();
        }

        let list = list_patient_prescriptions(&s.conn, s.patient_id).unwrap();
        let dates: Vec<&str> = list.iter().map(|p| p.date_issued.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-10", "2024-01-10"]);
        assert!(list.iter().all(|p| p.items.len() == 1));

        assert!(list_patient_prescriptions(&s.conn, 999).unwrap().is_empty());
    }

    #[test]
    fn visit_history_carries_prescription_summaries() {
        let s = seed(0);
        let op = open_visit(&s.conn, s.patient_id, s.doctor_id, "OP");
        let mut req = request(s.patient_id, s.doctor_id, op, "OP");
        req.date_issued = Some("2024-05-01".into());
        let created = create_prescription(&s.conn, &req, None).unwrap();

        let history =
            crate::workflow::visit::list_patient_visit_history(&s.conn, s.patient_id).unwrap();
        assert_eq!(history.outpatient_visits[0].prescriptions.len(), 1);
        assert_eq!(history.outpatient_visits[0].prescriptions[0].id, created.id);
        assert_eq!(history.outpatient_visits[0].prescriptions[0].date_issued, "2024-05-01");
    }
}
