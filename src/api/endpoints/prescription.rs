//! Prescription endpoints.

use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use super::patient::PatientQuery;
use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiQuery, ApiResponse, UserContext};
use crate::workflow::assembler::PrescriptionDetails;
use crate::workflow::prescription::{self, CreatePrescriptionRequest};

/// `POST /patient/prescription`: returns the new prescription id.
///
/// Items naming an unknown medicine are skipped, not rejected.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreatePrescriptionRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let created = run(&ctx, |conn| {
        prescription::create_prescription(conn, &req, Some(user.user_id))
    })?;
    Ok(ApiResponse::success(created.id, "Successfully created a prescription"))
}

/// `GET /patient/prescription?patient_id=`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<PatientQuery>,
) -> Result<ApiResponse<Vec<PrescriptionDetails>>, ApiError> {
    let patient_id = query.require()?;
    let prescriptions = run(&ctx, |conn| prescription::list_patient_prescriptions(conn, patient_id))?;
    Ok(ApiResponse::success(prescriptions, "Successfully fetched prescriptions"))
}

#[derive(Debug, Deserialize)]
pub struct PrescriptionQuery {
    pub prescription_id: Option<i64>,
}

/// `GET /patient/prescription/details?prescription_id=`
pub async fn details(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<PrescriptionQuery>,
) -> Result<ApiResponse<PrescriptionDetails>, ApiError> {
    let prescription_id = query
        .prescription_id
        .ok_or_else(|| ApiError::Validation("Missing prescription_id".into()))?;
    let details = run(&ctx, |conn| prescription::get_prescription_details(conn, prescription_id))?;
    Ok(ApiResponse::success(details, "Successfully fetched prescription details"))
}
