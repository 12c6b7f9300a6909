use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::router::Valid;

pub const CREATED_STATUS: &str = "Success";
pub const DUPLICATE_STATUS: &str = "Already a user";

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    pub name: String,
    // email is only required to be non-empty; no format validation.
    #[validate(length(min = 1, message = "Email must not be empty."))]
    pub email: String,
    pub password: String,
}

/// Signup outcome, kept to the historical body shape.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "Status")]
    pub status: String,
}

/// Handler to create user.
///
/// The duplicate outcome comes from the unique constraint on `email`, not
/// from a check-then-insert sequence, so concurrent signups for one email
/// cannot both land.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Response>)> {
    match state
        .auth
        .register(&body.name, &body.email, &body.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, "account created");

            Ok((
                StatusCode::CREATED,
                Json(Response {
                    status: CREATED_STATUS.to_owned(),
                }),
            ))
        },
        Err(ServerError::AlreadyRegistered) => Ok((
            StatusCode::CONFLICT,
            Json(Response {
                status: DUPLICATE_STATUS.to_owned(),
            }),
        )),
        Err(err) => Err(err),
    }
}
