use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ErrorResponse, MatchStatus, Role, TargetType};
use crate::services::{CatalogError, StoreError};

/// Errors surfaced by engine operations
///
/// Every variant maps to a stable error code and HTTP status. Conflict-class
/// variants describe the outcome as "already done", since most of them come
/// from benign duplicates of the same logical action.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Swipe already recorded: {actor_id} -> {target_type}:{target_id}")]
    DuplicateSwipe {
        actor_id: String,
        target_id: String,
        target_type: TargetType,
    },

    #[error("Match {match_id} already rated by {role}")]
    AlreadyRated { match_id: Uuid, role: Role },

    #[error("Unknown or inactive target: {target_type}:{target_id}")]
    UnknownTarget {
        target_id: String,
        target_type: TargetType,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Cannot {action} match {match_id} while {from}")]
    InvalidStateTransition {
        match_id: Uuid,
        from: MatchStatus,
        action: &'static str,
    },

    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl EngineError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "validation_error",
            EngineError::DuplicateSwipe { .. } => "duplicate_swipe",
            EngineError::AlreadyRated { .. } => "already_rated",
            EngineError::UnknownTarget { .. } => "unknown_target",
            EngineError::NotFound(_) => "not_found",
            EngineError::Unauthorized(_) => "unauthorized",
            EngineError::InvalidStateTransition { .. } => "invalid_state_transition",
            EngineError::StorageConflict(_) => "storage_conflict",
            EngineError::RateLimited(_) => "rate_limited",
            EngineError::Collaborator(_) => "collaborator_error",
            EngineError::Storage(_) => "storage_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::DuplicateSwipe { .. } | EngineError::AlreadyRated { .. } => StatusCode::CONFLICT,
            EngineError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            EngineError::UnknownTarget { .. } | EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Unauthorized(_) => StatusCode::FORBIDDEN,
            EngineError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            EngineError::Collaborator(_) => StatusCode::BAD_GATEWAY,
            EngineError::StorageConflict(_) | EngineError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller
    pub fn public_message(&self) -> String {
        match self {
            EngineError::DuplicateSwipe { .. } => "You have already swiped on this target".to_string(),
            EngineError::AlreadyRated { role, .. } => {
                format!("This match has already been rated by the {}", role)
            }
            EngineError::Storage(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

impl error::ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.status().is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        HttpResponse::build(self.status()).json(ErrorResponse {
            error: self.code().to_string(),
            message: self.public_message(),
            status_code: self.status().as_u16(),
        })
    }
}

impl From<CatalogError> for EngineError {
    fn from(err: CatalogError) -> Self {
        EngineError::Collaborator(err.to_string())
    }
}

/// JSON error response for payload errors raised before a handler runs
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path errors (e.g. a malformed match id)
pub fn handle_path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path parameter: {}", err),
        status_code: 400,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_map_to_409() {
        let dup = EngineError::DuplicateSwipe {
            actor_id: "s1".to_string(),
            target_id: "p1".to_string(),
            target_type: TargetType::Provider,
        };
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        assert_eq!(dup.code(), "duplicate_swipe");

        let rated = EngineError::AlreadyRated {
            match_id: Uuid::new_v4(),
            role: Role::Seeker,
        };
        assert_eq!(rated.status(), StatusCode::CONFLICT);
        assert!(rated.public_message().contains("already been rated"));
    }

    #[test]
    fn test_storage_errors_hide_details() {
        let err = EngineError::Storage(StoreError::Corrupt("matches.compatibility: bad json".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("bad json"));
    }

    #[test]
    fn test_transition_message() {
        let err = EngineError::InvalidStateTransition {
            match_id: Uuid::nil(),
            from: MatchStatus::Declined,
            action: "accept",
        };
        assert_eq!(err.code(), "invalid_state_transition");
        assert!(err.to_string().contains("accept"));
        assert!(err.to_string().contains("declined"));
    }
}
