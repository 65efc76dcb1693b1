//! # Error responses for options endpoints
//!
//! Option lookups have no failure modes of their own: bad optional input
//! degrades to defaults. What remains are storage failures, which are logged
//! server-side and answered with a sanitized message.
//!
//! ```rust,ignore
//! async fn product_options(
//!     Query(request): Query<OptionsRequest>,
//!     State(db): State<DatabaseConnection>,
//! ) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
//!     let options = Options::new(product::Entity::find(), "id", ["name"]);
//!     Ok(Json(options.respond(&db, &request.into()).await?))
//! }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// API error with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        /// User-facing error message
        message: String,
    },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: DbErr,
    },
}

impl ApiError {
    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> &str {
        match self {
            Self::NotFound { message } | Self::Database { message, .. } => message,
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal, .. } => {
                tracing::error!(error = ?internal, "Database error occurred");
            }
            Self::NotFound { message } => {
                tracing::debug!(error = %message, status = %self.status_code(), "API error");
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let body = Json(ErrorResponse {
            error: self.user_message(),
        });
        (self.status_code(), body).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// `DbErr::RecordNotFound` becomes 404; every other `DbErr` becomes 500.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(message) => Self::NotFound { message },
            other => Self::database(other),
        }
    }
}
