use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::Result;
use crate::router::Message;
use crate::session::AuthSession;
use crate::user::{User, Verification};

/// Landing route for verified signins.
pub const SUCCESS_ROUTE: &str = "/dash";
/// Landing route for rejected signins.
pub const FAILURE_ROUTE: &str = "/fail";

#[derive(Debug, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Verify credentials and establish a session cookie.
///
/// Unknown email and wrong password land on the same failure route with the
/// same status, so a caller cannot probe which emails are registered.
pub async fn handler(
    State(state): State<AppState>,
    auth_session: AuthSession,
    Form(credentials): Form<Credentials>,
) -> Result<Redirect> {
    match state
        .auth
        .authenticate(&credentials.email, &credentials.password)
        .await?
    {
        Verification::Verified(user) => {
            auth_session.login(&user).await?;
            tracing::info!(user_id = user.id, "session established");

            Ok(Redirect::to(SUCCESS_ROUTE))
        },
        Verification::NoSuchUser | Verification::PasswordMismatch => {
            Ok(Redirect::to(FAILURE_ROUTE))
        },
    }
}

#[derive(Debug, Serialize)]
pub struct Landing {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    datas: Option<User>,
}

/// Landing route after a successful signin.
pub async fn landing(auth_session: AuthSession) -> Json<Landing> {
    Json(Landing {
        message: "Login successful",
        datas: auth_session.into_principal(),
    })
}

/// Landing route after a failed signin.
pub async fn failure() -> (StatusCode, Json<Message>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(Message {
            message: "Login failed",
        }),
    )
}

#[cfg(test)]
pub(super) mod tests {
    use axum::Router;
    use axum::http::{Method, StatusCode, header};
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use crate::{app, make_request, router};

    pub(crate) const FORM: &str = "application/x-www-form-urlencoded";
    const JSON: &str = "application/json";

    /// Create Alice through the public signup route.
    pub(crate) async fn signup_alice(app: Router) {
        let body =
            json!({ "name": "Alice", "email": "a@x.com", "password": "pw1" })
                .to_string();
        let response =
            make_request(app, Method::POST, "/signup", JSON, body, None).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    /// Sign Alice in and return her session cookie.
    pub(crate) async fn signin_alice(app: Router) -> String {
        let response = make_request(
            app,
            Method::POST,
            "/signin",
            FORM,
            "email=a%40x.com&password=pw1".to_owned(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("signin must set a session cookie")
            .to_str()
            .unwrap();

        // strip the attributes, keep `name=value`.
        cookie.split(';').next().unwrap().to_owned()
    }

    #[sqlx::test]
    async fn test_signin_success_redirects(pool: Pool<Postgres>) {
        let state = router::state(pool).await;
        let app = app(state);

        signup_alice(app.clone()).await;

        let response = make_request(
            app,
            Method::POST,
            "/signin",
            FORM,
            "email=a%40x.com&password=pw1".to_owned(),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            super::SUCCESS_ROUTE
        );
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[sqlx::test]
    async fn test_signin_failures_are_uniform(pool: Pool<Postgres>) {
        let state = router::state(pool).await;
        let app = app(state);

        signup_alice(app.clone()).await;

        // unknown email.
        let unknown = make_request(
            app.clone(),
            Method::POST,
            "/signin",
            FORM,
            "email=ghost%40x.com&password=pw1".to_owned(),
            None,
        )
        .await;

        // known email, wrong password.
        let mismatch = make_request(
            app,
            Method::POST,
            "/signin",
            FORM,
            "email=a%40x.com&password=wrong".to_owned(),
            None,
        )
        .await;

        assert_eq!(unknown.status(), StatusCode::SEE_OTHER);
        assert_eq!(mismatch.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            unknown.headers().get(header::LOCATION).unwrap(),
            super::FAILURE_ROUTE
        );
        assert_eq!(
            unknown.headers().get(header::LOCATION),
            mismatch.headers().get(header::LOCATION)
        );
    }
}
