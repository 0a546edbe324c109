//! Patient endpoints.
//!
//! Registration and edits live under `/entity/patient`; read-only clinical
//! views under `/patient/*`.

use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, ApiQuery, ApiResponse, UserContext};
use crate::workflow::assembler::{PatientDetails, PatientListItem, VisitHistory};
use crate::workflow::directory::{self, CreatePatientRequest, EditPatientRequest};
use crate::workflow::visit;

/// `POST /entity/patient`: returns the new patient id.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreatePatientRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| directory::create_patient(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully created a patient"))
}

#[derive(Debug, Deserialize)]
pub struct EntityQuery {
    pub entity_id: Option<i64>,
}

/// `GET /entity/patient?entity_id=`: active patients only.
pub async fn list(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> Result<ApiResponse<Vec<PatientListItem>>, ApiError> {
    let patients = run(&ctx, |conn| directory::list_patients(conn, query.entity_id))?;
    Ok(ApiResponse::success(patients, "Successfully fetched patients"))
}

/// `PUT /entity/patient/:id`
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiPath(patient_id): ApiPath<i64>,
    ApiJson(req): ApiJson<EditPatientRequest>,
) -> Result<ApiResponse<PatientDetails>, ApiError> {
    let patient = run(&ctx, |conn| {
        directory::edit_patient(conn, patient_id, &req, Some(user.user_id))
    })?;
    Ok(ApiResponse::success(patient, "Patient updated successfully"))
}

#[derive(Debug, Deserialize)]
pub struct PatientDetailsQuery {
    pub entity_id: Option<i64>,
    pub patient_id: Option<i64>,
}

/// `GET /patient/details?entity_id=&patient_id=`
pub async fn details(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<PatientDetailsQuery>,
) -> Result<ApiResponse<PatientDetails>, ApiError> {
    let patient = run(&ctx, |conn| {
        directory::get_patient_details(conn, query.entity_id, query.patient_id)
    })?;
    Ok(ApiResponse::success(patient, "Successfully fetched patient details"))
}

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub patient_id: Option<i64>,
}

impl PatientQuery {
    pub fn require(&self) -> Result<i64, ApiError> {
        self.patient_id
            .ok_or_else(|| ApiError::Validation("Missing patient_id".into()))
    }
}

/// `GET /patient/visits?patient_id=`: inpatient and outpatient history.
pub async fn visit_history(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<PatientQuery>,
) -> Result<ApiResponse<VisitHistory>, ApiError> {
    let patient_id = query.require()?;
    let history = run(&ctx, |conn| visit::list_patient_visit_history(conn, patient_id))?;
    Ok(ApiResponse::success(history, "Successfully fetched patient visit history"))
}
