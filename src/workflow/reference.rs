//! Reference validation for foreign keys carried by requests.
//!
//! `resolve` loads a record by id or fails with `"<Kind> not found"`;
//! `resolve_active` additionally rejects soft-deleted rows. Both are
//! read-only. Callers chain them in the order they want reported.

use rusqlite::Connection;

use super::WorkflowError;
use crate::db::{self, DatabaseError};
use crate::models::*;

/// A record kind that can be looked up by integer id.
pub trait Resolvable: Sized {
    /// Human name used in "not found" messages.
    const KIND: &'static str;

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError>;

    fn is_active(&self) -> bool {
        true
    }
}

pub fn not_found<T: Resolvable>() -> WorkflowError {
    WorkflowError::NotFound(format!("{} not found", T::KIND))
}

pub fn resolve<T: Resolvable>(conn: &Connection, id: i64) -> Result<T, WorkflowError> {
    T::fetch(conn, id)?.ok_or_else(not_found::<T>)
}

pub fn resolve_active<T: Resolvable>(conn: &Connection, id: i64) -> Result<T, WorkflowError> {
    match T::fetch(conn, id)? {
        Some(record) if record.is_active() => Ok(record),
        _ => Err(not_found::<T>()),
    }
}

// ═══════════════════════════════════════════════════════════
// Kinds
// ═══════════════════════════════════════════════════════════

impl Resolvable for Patient {
    const KIND: &'static str = "Patient";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_patient(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Employees are referenced from clinical records only as the treating doctor.
impl Resolvable for Employee {
    const KIND: &'static str = "Doctor";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_employee(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for Entity {
    const KIND: &'static str = "Entity";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_entity(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for Visit {
    const KIND: &'static str = "Visit";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_visit(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for Medicine {
    const KIND: &'static str = "Medicine";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_medicine(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for Appointment {
    const KIND: &'static str = "Appointment";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_appointment(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for Room {
    const KIND: &'static str = "Room";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_room(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for RoomCategory {
    const KIND: &'static str = "Room category";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_room_category(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for RoomOccupancy {
    const KIND: &'static str = "Room occupancy";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_room_occupancy(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for EmployeeCategory {
    const KIND: &'static str = "Employee category";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_employee_category(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for MedicineCategory {
    const KIND: &'static str = "Medicine category";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_medicine_category(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Resolvable for User {
    const KIND: &'static str = "User";
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self>, DatabaseError> {
        db::get_user(conn, id)
    }
    fn is_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::fixtures::seed;
    use rusqlite::params;

    fn message(err: WorkflowError) -> String {
        match err {
            WorkflowError::NotFound(msg) => msg,
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn resolves_existing_records() {
        let s = seed(1);
        let patient: Patient = resolve(&s.conn, s.patient_id).unwrap();
        assert_eq!(patient.id, s.patient_id);
        let doctor: Employee = resolve_active(&s.conn, s.doctor_id).unwrap();
        assert_eq!(doctor.email, "doc@x.com");
        let entity: Entity = resolve(&s.conn, s.entity_id).unwrap();
        assert_eq!(entity.name, "City Hospital");
    }

    #[test]
    fn missing_record_names_its_kind() {
        let s = seed(0);
        assert_eq!(message(resolve::<Patient>(&s.conn, 99).unwrap_err()), "Patient not found");
        assert_eq!(message(resolve::<Employee>(&s.conn, 99).unwrap_err()), "Doctor not found");
        assert_eq!(message(resolve::<Entity>(&s.conn, 99).unwrap_err()), "Entity not found");
        assert_eq!(message(resolve::<Visit>(&s.conn, 99).unwrap_err()), "Visit not found");
        assert_eq!(message(resolve::<Medicine>(&s.conn, 99).unwrap_err()), "Medicine not found");
    }

    #[test]
    fn resolve_active_rejects_soft_deleted() {
        let s = seed(0);
        s.conn
            .execute("UPDATE patient SET is_active = 0 WHERE id = ?1", params![s.patient_id])
            .unwrap();

        assert!(resolve::<Patient>(&s.conn, s.patient_id).is_ok());
        assert_eq!(
            message(resolve_active::<Patient>(&s.conn, s.patient_id).unwrap_err()),
            "Patient not found"
        );
    }

    #[test]
    fn seeded_employee_categories_resolve() {
        let s = seed(0);
        let category: EmployeeCategory = resolve(&s.conn, 1).unwrap();
        assert_eq!(category.name, "Doctor");
    }
}
