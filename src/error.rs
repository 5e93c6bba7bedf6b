//! Error taxonomy for the complaint core.
//!
//! Four caller-visible failure kinds; classification faults are *not* here
//! because the AI adapter recovers them locally into the safe default and
//! complaint creation always succeeds with some classification attached.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::model::Status;

#[derive(Debug, Error)]
pub enum DeskError {
    /// Missing or malformed input; rejected before any state change.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The actor's role (or identity) does not permit the operation.
    #[error("not authorized: {0}")]
    Authorization(String),

    /// No edge from the current state to the requested one.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("not found: {0}")]
    NotFound(String),
}

impl DeskError {
    pub fn kind(&self) -> &'static str {
        match self {
            DeskError::Validation(_) => "validation",
            DeskError::Authorization(_) => "authorization",
            DeskError::InvalidTransition { .. } => "invalid_transition",
            DeskError::NotFound(_) => "not_found",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            DeskError::Validation(_) => StatusCode::BAD_REQUEST,
            DeskError::Authorization(_) => StatusCode::FORBIDDEN,
            DeskError::InvalidTransition { .. } => StatusCode::CONFLICT,
            DeskError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for DeskError {
    fn into_response(self) -> Response {
        let body = json!({
            "kind": self.kind(),
            "error": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

pub type DeskResult<T> = Result<T, DeskError>;
