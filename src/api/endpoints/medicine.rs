//! Medicine catalog endpoints.

use axum::extract::State;
use axum::Extension;

use super::patient::EntityQuery;
use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiQuery, ApiResponse, UserContext};
use crate::workflow::assembler::MedicineCatalogCategory;
use crate::workflow::directory::{self, CreateMedicineCategoryRequest, CreateMedicineRequest};

/// `GET /entity/medicine[?entity_id=]`: active categories with their medicines.
pub async fn catalog(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<EntityQuery>,
) -> Result<ApiResponse<Vec<MedicineCatalogCategory>>, ApiError> {
    let catalog = run(&ctx, |conn| directory::list_medicine_catalog(conn, query.entity_id))?;
    Ok(ApiResponse::success(
        catalog,
        "Successfully fetched medicine categories and medicines",
    ))
}

/// `POST /entity/medicine/category`
pub async fn create_category(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateMedicineCategoryRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| {
        directory::create_medicine_category(conn, &req, Some(user.user_id))
    })?;
    Ok(ApiResponse::success(id, "Successfully added medicine category"))
}

/// `POST /entity/medicine`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateMedicineRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| directory::create_medicine(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully added medicine"))
}
