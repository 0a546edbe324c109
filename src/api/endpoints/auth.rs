//! Account endpoints.
//!
//! `POST /auth/register` and `POST /auth/login` are public;
//! `GET /auth/profile` requires a bearer token.

use axum::extract::State;
use axum::Extension;

use super::run;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, ApiResponse, UserContext};
use crate::auth::{self, Credentials, LoginResponse};
use crate::models::User;
use crate::workflow::assembler::ProfileView;

/// `POST /auth/register`
pub async fn register(
    State(ctx): State<ApiContext>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<ApiResponse<User>, ApiError> {
    let user = run(&ctx, |conn| auth::register(conn, &credentials))?;
    Ok(ApiResponse::success(user, "User created successfully"))
}

/// `POST /auth/login`: returns a bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let ttl_hours = ctx.core.config.token_ttl_hours;
    let issued = run(&ctx, |conn| auth::login(conn, &credentials, ttl_hours))?;
    Ok(ApiResponse::success(issued, "Successfully logged in"))
}

/// `GET /auth/profile`: the caller and the entities they belong to.
pub async fn profile(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<ApiResponse<ProfileView>, ApiError> {
    let view = run(&ctx, |conn| auth::profile(conn, user.user_id))?;
    Ok(ApiResponse::success(view, "Successfully validated the user"))
}
