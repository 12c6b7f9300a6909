//! Passage is a minimal session-cookie authentication backend.

#[forbid(unsafe_code)]
#[deny(missing_docs, unused_mut)]
mod crypto;
mod database;
pub mod error;
mod router;
pub mod session;
pub mod user;

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::{delete, get, post};
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::CorsLayer;
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tower_sessions::SessionManagerLayer;
use tower_sessions::cookie::Key;
use tower_sessions_sqlx_store::PostgresStore;

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    content_type: &str,
    body: String,
    cookie: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub auth: user::AuthService,
    pub session_store: PostgresStore,
    pub cookie_key: Key,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .include_headers(true)
                        .level(tracing::Level::INFO),
                )
                .on_request(DefaultOnRequest::new())
                .on_response(
                    DefaultOnResponse::new()
                        .include_headers(true)
                        .latency_unit(LatencyUnit::Micros),
                ),
        )
        // Set a timeout.
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]));

    // Sessions ride an opaque signed cookie; state lives in Postgres.
    let session_layer = SessionManagerLayer::new(state.session_store.clone())
        .with_secure(false)
        .with_signed(state.cookie_key.clone());

    let mut router = Router::new()
        // `POST /signup` goes to `signup`.
        .route("/signup", post(router::signup::handler))
        // `POST /signin` goes to `signin`, which redirects.
        .route("/signin", post(router::signin::handler))
        .route("/dash", get(router::signin::landing))
        .route("/fail", get(router::signin::failure))
        // Session-gated pages.
        .route("/dashboard", get(router::profile::dashboard))
        .route("/profile", get(router::profile::profile))
        .route("/login/success", get(router::login_status::handler))
        // `DELETE /logout` invalidates the session.
        .route("/logout", delete(router::logout::handler))
        .layer(session_layer)
        .with_state(state.clone());

    if let Some(cors) = cors(&state.config) {
        router = router.layer(cors);
    }

    router.layer(middleware)
}

/// CORS layer for the configured front-end origin.
///
/// Credentialed requests forbid a wildcard origin, so the layer only exists
/// when an origin is configured and parses.
fn cors(config: &config::Configuration) -> Option<CorsLayer> {
    let origin = config.cors_origin.as_ref()?;

    match origin.parse::<axum::http::HeaderValue>() {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([header::CONTENT_TYPE])
                .allow_credentials(true),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "invalid `cors_origin`, CORS disabled");
            None
        },
    }
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file. let it in memory.
    let config = config::Configuration::default().read();

    let db = match config.postgres {
        Some(ref cfg) => {
            database::Database::new(
                &cfg.address,
                cfg.username
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                cfg.password
                    .as_deref()
                    .unwrap_or(database::DEFAULT_CREDENTIALS),
                cfg.database
                    .as_deref()
                    .unwrap_or(database::DEFAULT_DATABASE_NAME),
                cfg.pool_size.unwrap_or(database::DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            return Err("missing `postgres` entry on `config.yaml` file".into());
        },
    };

    // execute migrations scripts on start.
    sqlx::migrate!().run(&db.postgres).await?;

    let session_store = PostgresStore::new(db.postgres.clone());
    session_store.migrate().await?;

    let secret = std::env::var("SESSION_SECRET")
        .map_err(|_| "missing `SESSION_SECRET` environment variable")?;
    // signing requires 512 bits of key material.
    let cookie_key = Key::try_from(secret.as_bytes())
        .map_err(|_| "`SESSION_SECRET` must be at least 64 bytes")?;

    let crypto = Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);
    let auth = user::AuthService::new(db.postgres.clone(), crypto);

    Ok(AppState {
        config,
        db,
        auth,
        session_store,
        cookie_key,
    })
}
