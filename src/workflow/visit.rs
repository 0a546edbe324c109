//! Appointment and visit workflow.
//!
//! Appointments optionally precede visits. A visit opens on creation,
//! takes any number of partial edits, and is closed for inpatients by
//! setting `discharge_date`. No transition is enforced.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Deserialize;

use super::assembler::{self, AppointmentView, VisitHistory, VisitView};
use super::reference::resolve;
use super::WorkflowError;
use crate::db::{self, fmt_timestamp, optional_text, ColumnChange};
use crate::models::enums::VisitType;
use crate::models::*;

const INVALID_VISIT_TYPE: &str = "Invalid visit type. Should be 'IP' or 'OP'.";

// ═══════════════════════════════════════════════════════════
// Appointments
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub appointment_time: DateTime<Utc>,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub notes: String,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub entity_id: i64,
}

pub fn create_appointment(
    conn: &Connection,
    req: &CreateAppointmentRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    resolve::<Patient>(conn, req.patient_id)?;
    resolve::<Employee>(conn, req.doctor_id)?;
    resolve::<Entity>(conn, req.entity_id)?;

    let id = db::insert_appointment(
        conn,
        &NewAppointment {
            appointment_time: req.appointment_time,
            reason: req.reason.clone(),
            notes: req.notes.clone(),
            patient_id: req.patient_id,
            employee_id: req.doctor_id,
            entity_id: req.entity_id,
            created_by: actor,
        },
    )?;

    tracing::info!(appointment_id = id, patient_id = req.patient_id, "Appointment created");
    Ok(id)
}

/// With an entity filter the entity must exist and only its active
/// appointments are listed; without one every appointment is listed.
pub fn list_appointments(
    conn: &Connection,
    entity_id: Option<i64>,
) -> Result<Vec<AppointmentView>, WorkflowError> {
    if let Some(entity_id) = entity_id {
        resolve::<Entity>(conn, entity_id)?;
    }

    let filter = AppointmentFilter {
        entity_id,
        active_only: entity_id.is_some(),
    };
    let rows = db::list_appointments(conn, &filter)?;
    Ok(rows.into_iter().map(assembler::appointment_view).collect())
}

// ═══════════════════════════════════════════════════════════
// Visits
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVisitRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(default)]
    pub appointment_id: Option<i64>,
    #[serde(default)]
    pub visit_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub admission_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discharge_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub room_number: Option<String>,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub treatment_plan: String,
    #[serde(default)]
    pub notes: String,
    pub visit_type: String,
}

pub fn create_visit(
    conn: &Connection,
    req: &CreateVisitRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    resolve::<Patient>(conn, req.patient_id)?;
    resolve::<Employee>(conn, req.doctor_id)?;
    if let Some(appointment_id) = req.appointment_id {
        resolve::<Appointment>(conn, appointment_id)?;
    }

    let visit_type = VisitType::from_str(req.visit_type.trim()).map_err(|_| {
        tracing::warn!(visit_type = %req.visit_type, "Rejected visit type");
        WorkflowError::Validation(INVALID_VISIT_TYPE.into())
    })?;

    let id = db::insert_visit(
        conn,
        &NewVisit {
            appointment_id: req.appointment_id,
            visit_date: req.visit_date.unwrap_or_else(Utc::now),
            admission_date: req.admission_date,
            discharge_date: req.discharge_date,
            room_number: req.room_number.clone(),
            diagnosis: req.diagnosis.clone(),
            treatment_plan: req.treatment_plan.clone(),
            notes: req.notes.clone(),
            patient_id: req.patient_id,
            doctor_id: req.doctor_id,
            visit_type,
            created_by: actor,
        },
    )?;

    tracing::info!(visit_id = id, visit_type = %visit_type, "Visit created");
    Ok(id)
}

/// Partial visit edit. Absent fields keep their stored value; the
/// nullable columns accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditVisitRequest {
    #[serde(default)]
    pub visit_id: i64,
    #[serde(default)]
    pub visit_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::deserialize_some")]
    pub admission_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::deserialize_some")]
    pub discharge_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "super::deserialize_some")]
    pub room_number: Option<Option<String>>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment_plan: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl EditVisitRequest {
    fn changes(&self) -> Vec<ColumnChange> {
        let timestamp = |ts: &Option<DateTime<Utc>>| {
            ts.as_ref()
                .map(|t| Value::Text(fmt_timestamp(t)))
                .unwrap_or(Value::Null)
        };

        let mut changes: Vec<ColumnChange> = Vec::new();
        if let Some(visit_date) = &self.visit_date {
            changes.push(("visit_date", Value::Text(fmt_timestamp(visit_date))));
        }
        if let Some(admission_date) = &self.admission_date {
            changes.push(("admission_date", timestamp(admission_date)));
        }
        if let Some(discharge_date) = &self.discharge_date {
            changes.push(("discharge_date", timestamp(discharge_date)));
        }
        if let Some(room_number) = &self.room_number {
            changes.push(("room_number", optional_text(room_number.clone())));
        }
        if let Some(diagnosis) = &self.diagnosis {
            changes.push(("diagnosis", Value::Text(diagnosis.clone())));
        }
        if let Some(treatment_plan) = &self.treatment_plan {
            changes.push(("treatment_plan", Value::Text(treatment_plan.clone())));
        }
        if let Some(notes) = &self.notes {
            changes.push(("notes", Value::Text(notes.clone())));
        }
        if let Some(is_active) = self.is_active {
            changes.push(("is_active", Value::Integer(i64::from(is_active))));
        }
        changes
    }
}

pub fn edit_visit(
    conn: &Connection,
    req: &EditVisitRequest,
    actor: Option<i64>,
) -> Result<(), WorkflowError> {
    if req.visit_id == 0 {
        return Err(WorkflowError::Validation("visit_id is required".into()));
    }
    resolve::<Visit>(conn, req.visit_id)?;

    let changes = req.changes();
    if changes.is_empty() {
        tracing::debug!(visit_id = req.visit_id, "Visit edit with no fields");
        return Ok(());
    }

    db::update_columns(conn, "visit", req.visit_id, &changes, actor)?;
    tracing::info!(visit_id = req.visit_id, fields = changes.len(), "Visit updated");
    Ok(())
}

pub fn get_visit(conn: &Connection, visit_id: i64) -> Result<VisitView, WorkflowError> {
    let visit = resolve::<Visit>(conn, visit_id)?;
    let doctor_name = db::get_employee(conn, visit.doctor_id)?
        .map(|d| assembler::display_name(&d.first_name, &d.last_name))
        .unwrap_or_default();
    let prescriptions = db::list_prescriptions_for_visit(conn, visit.id, visit.visit_type)?;
    Ok(assembler::visit_view(visit, doctor_name, &prescriptions))
}

/// Visits of a patient split into inpatient and outpatient buckets. An
/// unknown patient simply has no visits.
pub fn list_patient_visit_history(
    conn: &Connection,
    patient_id: i64,
) -> Result<VisitHistory, WorkflowError> {
    let visits = db::list_visits_for_patient(conn, patient_id)?;

    let mut with_prescriptions = Vec::with_capacity(visits.len());
    for row in visits {
        let prescriptions =
            db::list_prescriptions_for_visit(conn, row.visit.id, row.visit.visit_type)?;
        with_prescriptions.push((row, prescriptions));
    }
    Ok(assembler::visit_history(with_prescriptions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::fixtures::seed;
    use chrono::TimeZone;
    use rusqlite::params;

    fn visit_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM visit", [], |row| row.get(0))
            .unwrap()
    }

    fn visit_request(patient_id: i64, doctor_id: i64, visit_type: &str) -> CreateVisitRequest {
        CreateVisitRequest {
            patient_id,
            doctor_id,
            appointment_id: None,
            visit_date: Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap()),
            admission_date: None,
            discharge_date: None,
            room_number: None,
            diagnosis: "Seasonal flu".into(),
            treatment_plan: "Fluids and rest".into(),
            notes: "First visit".into(),
            visit_type: visit_type.into(),
        }
    }

    fn appointment_request(patient_id: i64, doctor_id: i64, entity_id: i64) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            appointment_time: Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap(),
            reason: "Checkup".into(),
            notes: String::new(),
            patient_id,
            doctor_id,
            entity_id,
        }
    }

    #[test]
    fn create_appointment_checks_references_in_order() {
        let s = seed(0);

        let err = create_appointment(&s.conn, &appointment_request(99, 99, 99), None).unwrap_err();
        assert_eq!(err.to_string(), "Patient not found");

        let err = create_appointment(&s.conn, &appointment_request(s.patient_id, 99, 99), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Doctor not found");

        let err = create_appointment(&s.conn, &appointment_request(s.patient_id, s.doctor_id, 99), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "Entity not found");

        let id = create_appointment(
            &s.conn,
            &appointment_request(s.patient_id, s.doctor_id, s.entity_id),
            None,
        )
        .unwrap();
        assert!(id > 0);
    }

    #[test]
    fn list_appointments_joins_patient_and_doctor() {
        let s = seed(0);
        create_appointment(
            &s.conn,
            &appointment_request(s.patient_id, s.doctor_id, s.entity_id),
            None,
        )
        .unwrap();

        let rows = list_appointments(&s.conn, Some(s.entity_id)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].patient_firstname, "Ben");
        assert_eq!(rows[0].patient_dob, "1990-06-15");
        assert_eq!(rows[0].doctor_name, "Asha Rao");
    }

    #[test]
    fn list_appointments_for_entity_hides_inactive() {
        let s = seed(0);
        let id = create_appointment(
            &s.conn,
            &appointment_request(s.patient_id, s.doctor_id, s.entity_id),
            None,
        )
        .unwrap();
        s.conn
            .execute("UPDATE appointment SET is_active = 0 WHERE id = ?1", params![id])
            .unwrap();

        assert!(list_appointments(&s.conn, Some(s.entity_id)).unwrap().is_empty());
        assert_eq!(list_appointments(&s.conn, None).unwrap().len(), 1);
    }

    #[test]
    fn list_appointments_unknown_entity_is_not_found() {
        let s = seed(0);
        let err = list_appointments(&s.conn, Some(42)).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[test]
    fn create_visit_inserts_row() {
        let s = seed(0);
        let id = create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "OP"), Some(1))
            .unwrap_or_else(|e| panic!("{e}"));
        let visit = db::get_visit(&s.conn, id).unwrap().unwrap();
        assert_eq!(visit.visit_type, VisitType::Outpatient);
        assert_eq!(visit.diagnosis, "Seasonal flu");
        assert!(visit.is_active);
    }

    #[test]
    fn invalid_visit_type_inserts_nothing() {
        let s = seed(0);
        let err = create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "XX"), None)
            .unwrap_err();
        match err {
            WorkflowError::Validation(msg) => assert_eq!(msg, INVALID_VISIT_TYPE),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(visit_count(&s.conn), 0);
    }

    #[test]
    fn missing_appointment_inserts_nothing() {
        let s = seed(0);
        let mut req = visit_request(s.patient_id, s.doctor_id, "IP");
        req.appointment_id = Some(77);
        let err = create_visit(&s.conn, &req, None).unwrap_err();
        assert_eq!(err.to_string(), "Appointment not found");
        assert_eq!(visit_count(&s.conn), 0);
    }

    #[test]
    fn edit_notes_leaves_other_fields_untouched() {
        let s = seed(0);
        let mut req = visit_request(s.patient_id, s.doctor_id, "IP");
        req.room_number = Some("B-12".into());
        req.admission_date = Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap());
        let id = create_visit(&s.conn, &req, None).unwrap();
        let before = db::get_visit(&s.conn, id).unwrap().unwrap();

        edit_visit(
            &s.conn,
            &EditVisitRequest {
                visit_id: id,
                notes: Some("x".into()),
                ..Default::default()
            },
            None,
        )
        .unwrap();

        let after = db::get_visit(&s.conn, id).unwrap().unwrap();
        assert_eq!(after.notes, "x");
        assert_eq!(Visit { notes: before.notes.clone(), ..after }, before);
    }

    #[test]
    fn edit_can_set_and_clear_discharge_date() {
        let s = seed(0);
        let id = create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "IP"), None).unwrap();
        let discharge = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();

        let set: EditVisitRequest = serde_json::from_value(serde_json::json!({
            "visit_id": id,
            "discharge_date": discharge,
        }))
        .unwrap();
        edit_visit(&s.conn, &set, None).unwrap();
        assert_eq!(
            db::get_visit(&s.conn, id).unwrap().unwrap().discharge_date,
            Some(discharge)
        );

        let clear: EditVisitRequest = serde_json::from_value(serde_json::json!({
            "visit_id": id,
            "discharge_date": null,
        }))
        .unwrap();
        assert_eq!(clear.discharge_date, Some(None));
        edit_visit(&s.conn, &clear, None).unwrap();
        assert_eq!(db::get_visit(&s.conn, id).unwrap().unwrap().discharge_date, None);
    }

    #[test]
    fn absent_fields_deserialize_as_untouched() {
        let req: EditVisitRequest =
            serde_json::from_value(serde_json::json!({"visit_id": 3, "notes": "x"})).unwrap();
        assert_eq!(req.discharge_date, None);
        assert_eq!(req.room_number, None);
        assert_eq!(req.changes().len(), 1);
    }

    #[test]
    fn edit_missing_visit_is_not_found() {
        let s = seed(0);
        let err = edit_visit(
            &s.conn,
            &EditVisitRequest {
                visit_id: 404,
                notes: Some("x".into()),
                ..Default::default()
            },
            None,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Visit not found");
    }

    #[test]
    fn edit_without_visit_id_is_validation() {
        let s = seed(0);
        let err = edit_visit(&s.conn, &EditVisitRequest::default(), None).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn soft_delete_through_edit() {
        let s = seed(0);
        let id = create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "OP"), None).unwrap();
        edit_visit(
            &s.conn,
            &EditVisitRequest {
                visit_id: id,
                is_active: Some(false),
                ..Default::default()
            },
            None,
        )
        .unwrap();
        assert!(!db::get_visit(&s.conn, id).unwrap().unwrap().is_active);
    }

    #[test]
    fn history_of_visitless_patient_is_two_empty_lists() {
        let s = seed(0);
        let history = list_patient_visit_history(&s.conn, s.patient_id).unwrap();
        assert!(history.inpatient_visits.is_empty());
        assert!(history.outpatient_visits.is_empty());
    }

    #[test]
    fn history_partitions_visits() {
        let s = seed(0);
        create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "IP"), None).unwrap();
        create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "OP"), None).unwrap();
        create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "OP"), None).unwrap();

        let history = list_patient_visit_history(&s.conn, s.patient_id).unwrap();
        assert_eq!(history.inpatient_visits.len(), 1);
        assert_eq!(history.outpatient_visits.len(), 2);
        assert_eq!(history.inpatient_visits[0].doctor_name, "Asha Rao");
    }

    #[test]
    fn get_visit_returns_view() {
        let s = seed(0);
        let id = create_visit(&s.conn, &visit_request(s.patient_id, s.doctor_id, "OP"), None).unwrap();
        let view = get_visit(&s.conn, id).unwrap();
        assert_eq!(view.id, id);
        assert_eq!(view.visit_date, "2024-03-05");
        assert!(view.prescriptions.is_empty());
    }
}
