//! Error handler for passage.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error(transparent)]
    Hash(#[from] crate::crypto::CryptoError),

    #[error("session backend failed: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("email already registered")]
    AlreadyRegistered,

    #[error("internal server error, {0}")]
    Internal(String),
}

/// JSON body carrying a single error description.
///
/// Historical clients detect failures by inspecting this field, so the shape
/// is kept as-is; status codes differentiate the error kinds.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::Validation(_) | Self::Axum(_) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: self.to_string(),
                }),
            )
                .into_response(),

            Self::AlreadyRegistered => (
                StatusCode::CONFLICT,
                Json(serde_json::json!({ "Status": "Already a user" })),
            )
                .into_response(),

            Self::Hash(err) => {
                tracing::error!(error = %err, "password hashing failed");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "Error in hashing the password".to_owned(),
                    }),
                )
                    .into_response()
            },

            Self::Sql(err) => {
                tracing::error!(error = %err, "database request failed");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: err.to_string(),
                    }),
                )
                    .into_response()
            },

            Self::Session(err) => {
                tracing::error!(error = %err, "session backend failed");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: self.to_string(),
                    }),
                )
                    .into_response()
            },

            Self::Internal(details) => {
                tracing::error!(%details, "server returned 500 status");

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody {
                        error: "internal server error".to_owned(),
                    }),
                )
                    .into_response()
            },
        }
    }
}
