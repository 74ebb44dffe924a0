//! HTTP layer - pages and routing
//!
//! - `/tweets`: the signed-in user's feed (session required)
//! - `/login`, `/signup`, `/logout`: session management pages
//! - `/`: redirect to the feed

pub mod auth;
pub mod middleware;
pub mod tweets;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    middleware as axum_middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use tera::Context;
use tower_http::trace::TraceLayer;

use crate::models::User;

pub use middleware::{AppError, AppState, CurrentUser};

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    let tweet_routes = tweets::router().route_layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::require_session,
    ));

    Router::new()
        .route("/", get(|| async { Redirect::to(tweets::LIST_PATH) }))
        .merge(auth::router())
        .merge(tweet_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Template context every page starts from
pub(crate) fn page_context(user: Option<&User>) -> Context {
    let mut ctx = Context::new();
    if let Some(user) = user {
        ctx.insert("current_user", &user.username);
    }
    ctx
}

pub(crate) fn render(state: &AppState, template: &str, ctx: &Context) -> Result<String, AppError> {
    state.views.render(template, ctx).map_err(|e| {
        tracing::error!("{}", e);
        AppError::internal_error("Failed to render page")
    })
}

async fn not_found(State(state): State<AppState>, uri: Uri) -> Response {
    let mut ctx = page_context(None);
    ctx.insert("status", &StatusCode::NOT_FOUND.as_u16());
    ctx.insert("message", &format!("Nothing lives at {}", uri.path()));

    match render(&state, "error.html", &ctx) {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(_) => AppError::not_found("Page not found").into_response(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::Config;
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::services::{LoginInput, SignupInput};
    use axum::http::HeaderValue;
    use axum_test::TestServer;

    pub struct TestApp {
        pub server: TestServer,
        pub state: AppState,
        pub pool: DynDatabasePool,
    }

    pub async fn test_app() -> TestApp {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::from_pool(pool.clone(), &Config::default())
            .expect("Failed to build app state");
        let server = TestServer::new(build_router(state.clone())).expect("Failed to start test server");

        TestApp { server, state, pool }
    }

    /// Sign up `username` (password `secret123`) and return the user with a live session token
    pub async fn signed_in(state: &AppState, username: &str) -> (User, String) {
        let user = state
            .user_service
            .signup(SignupInput::new(username, "secret123"))
            .await
            .expect("Failed to sign up");
        let session = state
            .user_service
            .login(LoginInput::new(username, "secret123"))
            .await
            .expect("Failed to log in");
        (user, session.id)
    }

    pub fn cookie(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("session={}", token)).expect("valid cookie header")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_app;
    use axum::http::{header, StatusCode};

    #[tokio::test]
    async fn test_root_redirects_to_tweets() {
        let app = test_app().await;
        let response = app.server.get("/").await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/tweets");
    }

    #[tokio::test]
    async fn test_unknown_path_renders_not_found_page() {
        let app = test_app().await;
        let response = app.server.get("/nope").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert!(response.text().contains("Nothing lives at &#x2F;nope"));
    }
}
