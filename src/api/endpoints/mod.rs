//! API endpoint handlers.
//!
//! Handlers deserialize the request, run one workflow operation against
//! the shared connection and wrap the result in the success envelope.

pub mod appointment;
pub mod auth;
pub mod entity;
pub mod health;
pub mod medicine;
pub mod patient;
pub mod prescription;
pub mod room;
pub mod visit;

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::workflow::WorkflowError;

/// Run one workflow operation with the connection held.
pub(crate) fn run<T, F>(ctx: &ApiContext, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Connection) -> Result<T, WorkflowError>,
{
    ctx.core.with_db(|conn| f(conn).map_err(ApiError::from))
}
