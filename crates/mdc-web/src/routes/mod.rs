//! Route handlers.

pub mod calls;
pub mod crews;
pub mod internal;
pub mod online_users;
pub mod signal100;
pub mod storage;

use axum::http::StatusCode;
use mdc_core::MdcError;

/// Handler error: status plus a plain-text message.
pub type ApiError = (StatusCode, String);

/// Map a console error to an HTTP status.
pub fn api_error(e: MdcError) -> ApiError {
    let status = match &e {
        MdcError::CallNotFound(_)
        | MdcError::CrewNotFound(_)
        | MdcError::UserNotFound(_)
        | MdcError::TestNotFound(_)
        | MdcError::AssignmentNotFound(_) => StatusCode::NOT_FOUND,
        MdcError::ValidationError(_) | MdcError::InvalidStateTransition { .. } => {
            StatusCode::BAD_REQUEST
        }
        MdcError::UserExists(_) => StatusCode::CONFLICT,
        MdcError::Restricted(_) | MdcError::PendingApproval(_) => StatusCode::FORBIDDEN,
        MdcError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}
