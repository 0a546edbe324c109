//! Visit endpoints.

use axum::extract::State;
use axum::Extension;

use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiPath, ApiResponse, UserContext};
use crate::workflow::assembler::VisitView;
use crate::workflow::visit::{self, CreateVisitRequest, EditVisitRequest};

/// `POST /entity/visit`: returns the new visit id.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateVisitRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| visit::create_visit(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully created visit"))
}

/// `PUT /entity/visit`: partial update; only supplied fields change.
pub async fn edit(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<EditVisitRequest>,
) -> Result<ApiResponse<Option<()>>, ApiError> {
    run(&ctx, |conn| visit::edit_visit(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(None, "Visit updated successfully"))
}

/// `GET /entity/visit/:id`
pub async fn get(
    State(ctx): State<ApiContext>,
    ApiPath(visit_id): ApiPath<i64>,
) -> Result<ApiResponse<VisitView>, ApiError> {
    let view = run(&ctx, |conn| visit::get_visit(conn, visit_id))?;
    Ok(ApiResponse::success(view, "Successfully fetched visit"))
}
