use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

use crate::session::AuthSession;
use crate::user::User;

pub const AUTHORISED: &str = "Authorised";
pub const UNAUTHORISED: &str = "Unauthorised";

#[derive(Debug, Serialize)]
pub struct Dashboard {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<User>,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    datas: Option<User>,
}

/// Session-gated dashboard.
pub async fn dashboard(
    auth_session: AuthSession,
) -> (StatusCode, Json<Dashboard>) {
    match auth_session.into_principal() {
        Some(user) => (
            StatusCode::OK,
            Json(Dashboard {
                message: AUTHORISED,
                user: Some(user),
            }),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(Dashboard {
                message: UNAUTHORISED,
                user: None,
            }),
        ),
    }
}

/// Session-gated profile. Same gate as the dashboard; the payload field is
/// named `datas` for compatibility with existing clients.
pub async fn profile(auth_session: AuthSession) -> (StatusCode, Json<Profile>) {
    match auth_session.into_principal() {
        Some(user) => (
            StatusCode::OK,
            Json(Profile {
                message: AUTHORISED,
                datas: Some(user),
            }),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(Profile {
                message: UNAUTHORISED,
                datas: None,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use sqlx::{Pool, Postgres};

    use crate::router::signin::tests::{signin_alice, signup_alice};
    use crate::{app, make_request, router};

    const JSON: &str = "application/json";

    async fn body_json(
        response: axum::http::Response<axum::body::Body>,
    ) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[sqlx::test]
    async fn test_gates_reject_without_session(pool: Pool<Postgres>) {
        let state = router::state(pool).await;
        let app = app(state);

        for path in ["/dashboard", "/profile"] {
            let response = make_request(
                app.clone(),
                Method::GET,
                path,
                JSON,
                String::new(),
                None,
            )
            .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

            let body = body_json(response).await;
            assert_eq!(body["message"], super::UNAUTHORISED);
        }
    }

    #[sqlx::test]
    async fn test_session_round_trip(pool: Pool<Postgres>) {
        let state = router::state(pool).await;
        let app = app(state);

        signup_alice(app.clone()).await;
        let cookie = signin_alice(app.clone()).await;

        // both gates accept the cookie and expose the same principal.
        let response = make_request(
            app.clone(),
            Method::GET,
            "/profile",
            JSON,
            String::new(),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], super::AUTHORISED);
        assert_eq!(body["datas"]["name"], "Alice");
        assert_eq!(body["datas"]["email"], "a@x.com");
        // the stored hash never serializes.
        assert!(body["datas"].get("password").is_none());

        let response = make_request(
            app.clone(),
            Method::GET,
            "/dashboard",
            JSON,
            String::new(),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], super::AUTHORISED);
        assert_eq!(body["user"]["name"], "Alice");

        // logout invalidates the cookie for both gates.
        let response = make_request(
            app.clone(),
            Method::DELETE,
            "/logout",
            JSON,
            String::new(),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Logged out successfully");

        let response = make_request(
            app,
            Method::GET,
            "/profile",
            JSON,
            String::new(),
            Some(&cookie),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], super::UNAUTHORISED);
    }
}
