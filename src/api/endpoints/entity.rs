//! Entity and staff endpoints.

use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiQuery, ApiResponse, UserContext};
use crate::models::{Entity, EmployeeCategory, UserEntity};
use crate::workflow::assembler::EmployeeListItem;
use crate::workflow::directory::{
    self, CreateEmployeeRequest, CreateEntityRequest, LinkUserEntityRequest,
};

/// `POST /entity`
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateEntityRequest>,
) -> Result<ApiResponse<Entity>, ApiError> {
    let entity = run(&ctx, |conn| directory::create_entity(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(entity, "Successfully created an entity"))
}

/// `POST /entity/user`
pub async fn link_user(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<LinkUserEntityRequest>,
) -> Result<ApiResponse<UserEntity>, ApiError> {
    let link = run(&ctx, |conn| directory::link_user_entity(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(link, "Successfully linked user to entity"))
}

/// `GET /entity/employee/category`
pub async fn employee_categories(
    State(ctx): State<ApiContext>,
) -> Result<ApiResponse<Vec<EmployeeCategory>>, ApiError> {
    let categories = run(&ctx, directory::list_employee_categories)?;
    Ok(ApiResponse::success(categories, "Successfully fetched employee categories"))
}

/// `POST /entity/employee`: returns the new employee id.
pub async fn create_employee(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    ApiJson(req): ApiJson<CreateEmployeeRequest>,
) -> Result<ApiResponse<i64>, ApiError> {
    let id = run(&ctx, |conn| directory::create_employee(conn, &req, Some(user.user_id)))?;
    Ok(ApiResponse::success(id, "Successfully created an employee"))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeListQuery {
    pub entity_id: Option<i64>,
    pub employee_category_id: Option<i64>,
}

/// `GET /entity/employee?entity_id=&employee_category_id=`
pub async fn list_employees(
    State(ctx): State<ApiContext>,
    ApiQuery(query): ApiQuery<EmployeeListQuery>,
) -> Result<ApiResponse<Vec<EmployeeListItem>>, ApiError> {
    let employees = run(&ctx, |conn| {
        directory::list_employees(conn, query.entity_id, query.employee_category_id)
    })?;
    Ok(ApiResponse::success(employees, "Employee list returned successfully"))
}
