//! Directory records: entities, staff, patients, the medicine catalog and
//! rooms.
//!
//! Uniqueness is checked up front so callers get a specific message, and
//! the UNIQUE constraints in the schema catch whatever slips between the
//! check and the insert.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rusqlite::types::Value;
use rusqlite::Connection;
use serde::Deserialize;

use super::assembler::{
    self, EmployeeListItem, MedicineCatalogCategory, PatientDetails, PatientListItem, RoomView,
};
use super::reference::{resolve, resolve_active};
use super::{parse_request_date, WorkflowError};
use crate::db::{self, fmt_timestamp, optional_text, ColumnChange};
use crate::models::*;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

fn require(field: &str, value: &str) -> Result<(), WorkflowError> {
    if value.trim().is_empty() {
        return Err(WorkflowError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_email(email: &str) -> Result<(), WorkflowError> {
    require("email", email)?;
    if !is_valid_email(email.trim()) {
        return Err(WorkflowError::Validation("Invalid email format".into()));
    }
    Ok(())
}

fn require_id(field: &str, value: Option<i64>) -> Result<i64, WorkflowError> {
    match value {
        Some(id) if id > 0 => Ok(id),
        _ => Err(WorkflowError::Validation(format!("{field} is required"))),
    }
}

// ═══════════════════════════════════════════════════════════
// Entities
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntityRequest {
    pub name: String,
    pub address: String,
}

pub fn create_entity(
    conn: &Connection,
    req: &CreateEntityRequest,
    actor: Option<i64>,
) -> Result<Entity, WorkflowError> {
    require("name", &req.name)?;
    require("address", &req.address)?;
    let name = req.name.trim();

    if db::find_entity_by_name(conn, name)?.is_some() {
        tracing::warn!(name, "Entity name already taken");
        return Err(WorkflowError::Conflict("Entity with this name already exists".into()));
    }

    let id = db::insert_entity(
        conn,
        &NewEntity {
            name: name.to_string(),
            address: req.address.clone(),
            created_by: actor,
        },
    )
    .map_err(|e| WorkflowError::from_write(e, "Entity with this name already exists"))?;

    tracing::info!(entity_id = id, "Entity created");
    resolve::<Entity>(conn, id)
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkUserEntityRequest {
    pub user_id: i64,
    pub entity_id: i64,
}

pub fn link_user_entity(
    conn: &Connection,
    req: &LinkUserEntityRequest,
    actor: Option<i64>,
) -> Result<UserEntity, WorkflowError> {
    resolve::<User>(conn, req.user_id)?;
    resolve::<Entity>(conn, req.entity_id)?;

    const LINKED: &str = "User is already linked to this entity";
    if db::user_entity_exists(conn, req.user_id, req.entity_id)? {
        return Err(WorkflowError::Conflict(LINKED.into()));
    }
    let link = db::insert_user_entity(conn, req.user_id, req.entity_id, actor)
        .map_err(|e| WorkflowError::from_write(e, LINKED))?;

    tracing::info!(user_id = req.user_id, entity_id = req.entity_id, "User linked to entity");
    Ok(link)
}

// ═══════════════════════════════════════════════════════════
// Employees
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: String,
    pub entity_id: i64,
    pub employee_category_id: i64,
}

pub fn create_employee(
    conn: &Connection,
    req: &CreateEmployeeRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    require("first_name", &req.first_name)?;
    require("last_name", &req.last_name)?;
    require("phone_number", &req.phone_number)?;
    require_email(&req.email)?;
    let date_of_birth = parse_request_date("date_of_birth", &req.date_of_birth)?;

    resolve::<Entity>(conn, req.entity_id)?;
    resolve::<EmployeeCategory>(conn, req.employee_category_id)?;

    const TAKEN: &str = "Employee with this email already exists";
    let email = req.email.trim();
    if db::find_employee_by_email(conn, email)?.is_some() {
        tracing::warn!(entity_id = req.entity_id, "Employee email already taken");
        return Err(WorkflowError::Conflict(TAKEN.into()));
    }

    let id = db::insert_employee(
        conn,
        &NewEmployee {
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            email: email.to_string(),
            phone_number: req.phone_number.clone(),
            date_of_birth,
            entity_id: req.entity_id,
            employee_category_id: req.employee_category_id,
            created_by: actor,
        },
    )
    .map_err(|e| WorkflowError::from_write(e, TAKEN))?;

    tracing::info!(employee_id = id, entity_id = req.entity_id, "Employee created");
    Ok(id)
}

pub fn list_employees(
    conn: &Connection,
    entity_id: Option<i64>,
    employee_category_id: Option<i64>,
) -> Result<Vec<EmployeeListItem>, WorkflowError> {
    let entity_id = require_id("entity_id", entity_id)?;
    let filter = EmployeeFilter {
        entity_id: Some(entity_id),
        employee_category_id: employee_category_id.filter(|id| *id > 0),
    };
    let employees = db::list_employees(conn, &filter)?;
    Ok(employees.iter().map(assembler::employee_list_item).collect())
}

pub fn list_employee_categories(conn: &Connection) -> Result<Vec<EmployeeCategory>, WorkflowError> {
    Ok(db::list_employee_categories(conn)?)
}

// ═══════════════════════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePatientRequest {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub entity_id: i64,
    #[serde(default)]
    pub marital_status: String,
    #[serde(default)]
    pub occupation: Option<String>,
    pub doctor_id: i64,
}

const PATIENT_EMAIL_TAKEN: &str = "Patient with this email already exists";

pub fn create_patient(
    conn: &Connection,
    req: &CreatePatientRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    require("first_name", &req.first_name)?;
    require("last_name", &req.last_name)?;
    require("gender", &req.gender)?;
    require("contact_number", &req.contact_number)?;
    require("address", &req.address)?;
    require_email(&req.email)?;
    let date_of_birth = parse_request_date("date_of_birth", &req.date_of_birth)?;

    resolve::<Entity>(conn, req.entity_id)?;
    resolve::<Employee>(conn, req.doctor_id)?;

    let email = req.email.trim();
    if db::find_patient_by_email(conn, email)?.is_some() {
        tracing::warn!(entity_id = req.entity_id, "Patient email already taken");
        return Err(WorkflowError::Conflict(PATIENT_EMAIL_TAKEN.into()));
    }

    let id = db::insert_patient(
        conn,
        &NewPatient {
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            gender: req.gender.clone(),
            date_of_birth,
            contact_number: req.contact_number.clone(),
            email: email.to_string(),
            address: req.address.clone(),
            entity_id: req.entity_id,
            marital_status: req.marital_status.clone(),
            occupation: req.occupation.clone().filter(|o| !o.trim().is_empty()),
            doctor_id: req.doctor_id,
            created_by: actor,
        },
    )
    .map_err(|e| WorkflowError::from_write(e, PATIENT_EMAIL_TAKEN))?;

    tracing::info!(patient_id = id, entity_id = req.entity_id, "Patient created");
    Ok(id)
}

/// Active patients of one entity with their doctor's name.
pub fn list_patients(
    conn: &Connection,
    entity_id: Option<i64>,
) -> Result<Vec<PatientListItem>, WorkflowError> {
    let entity_id = require_id("entity_id", entity_id)?;
    let filter = PatientFilter {
        entity_id: Some(entity_id),
        active_only: true,
    };
    let rows = db::list_patients(conn, &filter)?;
    Ok(rows.into_iter().map(assembler::patient_list_item).collect())
}

pub fn get_patient_details(
    conn: &Connection,
    entity_id: Option<i64>,
    patient_id: Option<i64>,
) -> Result<PatientDetails, WorkflowError> {
    let (Some(entity_id), Some(patient_id)) = (entity_id, patient_id) else {
        return Err(WorkflowError::Validation("Missing entity_id or patient_id".into()));
    };
    let patient = db::get_patient_in_entity(conn, patient_id, entity_id)?.ok_or_else(|| {
        tracing::warn!(patient_id, entity_id, "Patient not in entity");
        WorkflowError::NotFound("Patient not found".into())
    })?;
    Ok(assembler::patient_details(patient))
}

/// Partial patient edit; `is_active: false` soft-deletes the patient.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditPatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub entity_id: Option<i64>,
    pub marital_status: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_some")]
    pub occupation: Option<Option<String>>,
    pub doctor_id: Option<i64>,
    pub is_active: Option<bool>,
}

pub fn edit_patient(
    conn: &Connection,
    patient_id: i64,
    req: &EditPatientRequest,
    actor: Option<i64>,
) -> Result<PatientDetails, WorkflowError> {
    resolve::<Patient>(conn, patient_id)?;

    let mut changes: Vec<ColumnChange> = Vec::new();
    let texts = [
        ("first_name", &req.first_name),
        ("last_name", &req.last_name),
        ("gender", &req.gender),
        ("contact_number", &req.contact_number),
        ("address", &req.address),
        ("marital_status", &req.marital_status),
    ];
    for (column, value) in texts {
        if let Some(value) = value {
            changes.push((column, Value::Text(value.clone())));
        }
    }

    if let Some(raw) = &req.date_of_birth {
        let date_of_birth = parse_request_date("date_of_birth", raw)?;
        changes.push(("date_of_birth", Value::Text(date_of_birth.to_string())));
    }
    if let Some(email) = &req.email {
        require_email(email)?;
        let email = email.trim();
        if let Some(other) = db::find_patient_by_email(conn, email)? {
            if other.id != patient_id {
                return Err(WorkflowError::Conflict(
                    "Email already exists for another patient".into(),
                ));
            }
        }
        changes.push(("email", Value::Text(email.to_string())));
    }
    if let Some(entity_id) = req.entity_id {
        resolve::<Entity>(conn, entity_id)?;
        changes.push(("entity_id", Value::Integer(entity_id)));
    }
    if let Some(doctor_id) = req.doctor_id {
        resolve::<Employee>(conn, doctor_id)?;
        changes.push(("doctor_id", Value::Integer(doctor_id)));
    }
    if let Some(occupation) = &req.occupation {
        changes.push(("occupation", optional_text(occupation.clone())));
    }
    if let Some(is_active) = req.is_active {
        changes.push(("is_active", Value::Integer(i64::from(is_active))));
    }

    db::update_columns(conn, "patient", patient_id, &changes, actor)
        .map_err(|e| WorkflowError::from_write(e, "Email already exists for another patient"))?;
    tracing::info!(patient_id, fields = changes.len(), "Patient updated");

    let patient = resolve::<Patient>(conn, patient_id)?;
    Ok(assembler::patient_details(patient))
}

// ═══════════════════════════════════════════════════════════
// Medicines
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicineCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub name_translations: Option<serde_json::Value>,
    #[serde(default)]
    pub description: String,
    pub entity_id: i64,
}

pub fn create_medicine_category(
    conn: &Connection,
    req: &CreateMedicineCategoryRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    require("name", &req.name)?;
    resolve::<Entity>(conn, req.entity_id)?;

    const TAKEN: &str = "Category already exists";
    let name = req.name.trim();
    if db::find_medicine_category_by_name(conn, req.entity_id, name)?.is_some() {
        return Err(WorkflowError::Conflict(TAKEN.into()));
    }

    let id = db::insert_medicine_category(
        conn,
        &NewMedicineCategory {
            name: name.to_string(),
            name_translations: req.name_translations.clone(),
            description: req.description.clone(),
            entity_id: req.entity_id,
            created_by: actor,
        },
    )
    .map_err(|e| WorkflowError::from_write(e, TAKEN))?;

    tracing::info!(category_id = id, entity_id = req.entity_id, "Medicine category created");
    Ok(id)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMedicineRequest {
    pub name: String,
    #[serde(default)]
    pub name_translations: Option<serde_json::Value>,
    pub category_id: i64,
    pub entity_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
}

pub fn create_medicine(
    conn: &Connection,
    req: &CreateMedicineRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    require("name", &req.name)?;
    if req.price < 0.0 || req.quantity < 0 {
        return Err(WorkflowError::Validation("price and quantity must not be negative".into()));
    }

    match db::get_medicine_category(conn, req.category_id)? {
        Some(category) if category.entity_id == req.entity_id => {}
        _ => {
            return Err(WorkflowError::Validation(
                "Invalid category ID for the given entity".into(),
            ))
        }
    }

    const TAKEN: &str = "Medicine already exists";
    let name = req.name.trim();
    if db::find_medicine_by_name(conn, req.entity_id, name)?.is_some() {
        return Err(WorkflowError::Conflict(TAKEN.into()));
    }

    let id = db::insert_medicine(
        conn,
        &NewMedicine {
            name: name.to_string(),
            name_translations: req.name_translations.clone(),
            category_id: req.category_id,
            entity_id: req.entity_id,
            description: req.description.clone(),
            price: req.price,
            quantity: req.quantity,
            created_by: actor,
        },
    )
    .map_err(|e| WorkflowError::from_write(e, TAKEN))?;

    tracing::info!(medicine_id = id, entity_id = req.entity_id, "Medicine created");
    Ok(id)
}

/// Active categories with their active medicines, optionally for one entity.
pub fn list_medicine_catalog(
    conn: &Connection,
    entity_id: Option<i64>,
) -> Result<Vec<MedicineCatalogCategory>, WorkflowError> {
    let filter = MedicineFilter {
        entity_id,
        active_only: true,
    };
    let categories = db::list_medicine_categories(conn, &filter)?;
    let medicines = db::list_medicines(conn, &filter)?;
    Ok(assembler::medicine_catalog(categories, medicines))
}

// ═══════════════════════════════════════════════════════════
// Rooms
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomCategoryRequest {
    pub name: String,
    pub price: f64,
}

pub fn create_room_category(
    conn: &Connection,
    req: &CreateRoomCategoryRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    require("name", &req.name)?;
    if req.price < 0.0 {
        return Err(WorkflowError::Validation("price must not be negative".into()));
    }

    const TAKEN: &str = "Room category already exists";
    let name = req.name.trim();
    if db::find_room_category_by_name(conn, name)?.is_some() {
        return Err(WorkflowError::Conflict(TAKEN.into()));
    }

    let id = db::insert_room_category(
        conn,
        &NewRoomCategory {
            name: name.to_string(),
            price: req.price,
            created_by: actor,
        },
    )
    .map_err(|e| WorkflowError::from_write(e, TAKEN))?;

    tracing::info!(room_category_id = id, "Room category created");
    Ok(id)
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub room_number: String,
    pub room_category_id: i64,
    #[serde(default)]
    pub price: Option<f64>,
}

pub fn create_room(
    conn: &Connection,
    req: &CreateRoomRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    require("room_number", &req.room_number)?;
    let category = resolve::<RoomCategory>(conn, req.room_category_id)?;

    const TAKEN: &str = "Room number already exists";
    let room_number = req.room_number.trim();
    if db::find_room_by_number(conn, room_number)?.is_some() {
        return Err(WorkflowError::Conflict(TAKEN.into()));
    }

    let id = db::insert_room(
        conn,
        &NewRoom {
            room_number: room_number.to_string(),
            room_category_id: category.id,
            price: req.price.unwrap_or(category.price),
            created_by: actor,
        },
    )
    .map_err(|e| WorkflowError::from_write(e, TAKEN))?;

    tracing::info!(room_id = id, "Room created");
    Ok(id)
}

pub fn list_rooms(conn: &Connection) -> Result<Vec<RoomView>, WorkflowError> {
    let rows = db::list_room_status(conn)?;
    Ok(rows.into_iter().map(assembler::room_view).collect())
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdmitToRoomRequest {
    pub room_id: i64,
    pub patient_id: i64,
    #[serde(default)]
    pub admit_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price_per_day: Option<f64>,
}

pub fn admit_to_room(
    conn: &Connection,
    req: &AdmitToRoomRequest,
    actor: Option<i64>,
) -> Result<i64, WorkflowError> {
    let room = resolve_active::<Room>(conn, req.room_id)?;
    resolve::<Patient>(conn, req.patient_id)?;

    if db::room_is_occupied(conn, room.id)? {
        tracing::warn!(room_id = room.id, "Room already occupied");
        return Err(WorkflowError::Conflict("Room is already occupied".into()));
    }

    let id = db::insert_room_occupancy(
        conn,
        &NewRoomOccupancy {
            room_id: room.id,
            patient_id: Some(req.patient_id),
            admit_date: req.admit_date.unwrap_or_else(Utc::now),
            price_per_day: req.price_per_day.unwrap_or(room.price),
            created_by: actor,
        },
    )?;

    tracing::info!(occupancy_id = id, room_id = room.id, "Patient admitted to room");
    Ok(id)
}

#[derive(Debug, Clone, Deserialize)]
pub struct DischargeFromRoomRequest {
    pub occupancy_id: i64,
    #[serde(default)]
    pub discharge_date: Option<DateTime<Utc>>,
}

pub fn discharge_from_room(
    conn: &Connection,
    req: &DischargeFromRoomRequest,
    actor: Option<i64>,
) -> Result<(), WorkflowError> {
    let occupancy = resolve_active::<RoomOccupancy>(conn, req.occupancy_id)?;
    let discharge_date = req.discharge_date.unwrap_or_else(Utc::now);

    db::update_columns(
        conn,
        "room_occupancy",
        occupancy.id,
        &[
            ("discharge_date", Value::Text(fmt_timestamp(&discharge_date))),
            ("is_active", Value::Integer(0)),
        ],
        actor,
    )?;

    tracing::info!(occupancy_id = occupancy.id, room_id = occupancy.room_id, "Patient discharged from room");
    Ok(())
}
