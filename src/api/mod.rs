//! HTTP API.
//!
//! Exposes the directory, visit and prescription workflows as JSON
//! endpoints. Every response uses one envelope: `ApiResponse` on success,
//! `ApiError` on failure. All routes except `/health`, `/auth/register`
//! and `/auth/login` require a bearer token.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::api_router;
pub use server::{start_api_server, ApiServer};
pub use types::{ApiContext, ApiResponse};
