//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Auth validator → 2. Audit logger
//!
//! CORS and `X-Content-Type-Options` wrap everything.

use std::sync::Arc;

use axum::http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(_)) => {
            tracing::warn!("HMS_FRONTEND_URL is not a valid origin; allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes: require a bearer token.
    //
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Auth → Audit (innermost) → Handler
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/profile", get(endpoints::auth::profile))
        .route("/entity", post(endpoints::entity::create))
        .route("/entity/user", post(endpoints::entity::link_user))
        .route(
            "/entity/employee/category",
            get(endpoints::entity::employee_categories),
        )
        .route(
            "/entity/employee",
            post(endpoints::entity::create_employee).get(endpoints::entity::list_employees),
        )
        .route(
            "/entity/patient",
            post(endpoints::patient::create).get(endpoints::patient::list),
        )
        .route("/entity/patient/:id", put(endpoints::patient::edit))
        .route(
            "/entity/appointment",
            post(endpoints::appointment::create).get(endpoints::appointment::list),
        )
        .route(
            "/entity/visit",
            post(endpoints::visit::create).put(endpoints::visit::edit),
        )
        .route("/entity/visit/:id", get(endpoints::visit::get))
        .route(
            "/entity/medicine",
            get(endpoints::medicine::catalog).post(endpoints::medicine::create),
        )
        .route(
            "/entity/medicine/category",
            post(endpoints::medicine::create_category),
        )
        .route(
            "/entity/room",
            post(endpoints::room::create).get(endpoints::room::list),
        )
        .route("/entity/room/category", post(endpoints::room::create_category))
        .route(
            "/entity/room/occupancy",
            post(endpoints::room::admit).put(endpoints::room::discharge),
        )
        .route("/patient/details", get(endpoints::patient::details))
        .route("/patient/visits", get(endpoints::patient::visit_history))
        .route(
            "/patient/prescription",
            post(endpoints::prescription::create).get(endpoints::prescription::list),
        )
        .route(
            "/patient/prescription/details",
            get(endpoints::prescription::details),
        )
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(ctx.clone()));

    // Unprotected routes
    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx.clone()));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(cors_layer(ctx.core.config.frontend_url.as_deref()))
}
