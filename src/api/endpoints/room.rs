//! Room and occupancy endpoints.

use axum::extract::State;
use axum::Extension;

use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiResponse, UserContext};
use crate::workflow::assembler::RoomView;
use crate::workflow::directory::{
    self, AdmitToRoomRequest, CreateRoomCategoryRequest, CreateRoomRequest,
    DischargeFromRoomRequest,
};

/// `POST /entity/room/category`
pub async fn create_category(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateRoomCategoryRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| directory::create_room_category(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully added room category"))
}

/// `POST /entity/room`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateRoomRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| directory::create_room(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully added room"))
}

/// `GET /entity/room`: active rooms with an `occupied` flag.
pub async fn list(State(ctx): State<ApiContext>) -> Result<ApiResponse<Vec<RoomView>>, ApiError> {
    let rooms = run(&ctx, directory::list_rooms)?;
    Ok(ApiResponse::success(rooms, "Successfully fetched rooms"))
}

/// `POST /entity/room/occupancy`: returns the occupancy id.
pub async fn admit(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<AdmitToRoomRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| directory::admit_to_room(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully admitted patient to room"))
}

/// `PUT /entity/room/occupancy`
pub async fn discharge(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<DischargeFromRoomRequest>,
) -> Result<ApiResponse<Option<()>>, ApiError> {
    run(&ctx, |conn| directory::discharge_from_room(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(None, "Successfully discharged patient from room"))
}
