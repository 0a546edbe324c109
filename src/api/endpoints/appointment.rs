//! Appointment endpoints.

use axum::extract::State;
use axum::Extension;

use super::patient::EntityQuery;
use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiQuery, ApiResponse, UserContext};
use crate::workflow::assembler::AppointmentView;
use crate::workflow::visit::{self, CreateAppointmentRequest};

/// `POST /entity/appointment`: returns the new appointment id.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateAppointmentRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| visit::create_appointment(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully created an appointment"))
}

/// `GET /entity/appointment?entity_id=`
pub async fn list(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> Result<ApiResponse<Vec<AppointmentView>>, ApiError> {
    let appointments = run(&ctx, |conn| visit::list_appointments(conn, query.entity_id))?;
    Ok(ApiResponse::success(appointments, "Successfully retrieved appointments"))
}
