//! Request plumbing shared by every page
//!
//! - `AppState`: the services handlers reach through `State`
//! - `require_session`: the guard in front of the tweets routes
//! - `CurrentUser`: the authenticated user, handed to handlers explicitly
//! - `AppError`: request-level failures rendered as a small HTML page

use anyhow::Result;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::config::Config;
use crate::db::repositories::{SqlxSessionRepository, SqlxTweetRepository, SqlxUserRepository};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::{TweetService, UserService};
use crate::views::ViewRenderer;

/// Where unauthenticated requests are sent
pub const LOGIN_PATH: &str = "/login";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub tweet_service: Arc<TweetService>,
    pub views: Arc<ViewRenderer>,
}

impl AppState {
    /// Wire repositories and services over an already migrated pool
    pub fn from_pool(pool: DynDatabasePool, config: &Config) -> Result<Self> {
        let user_service = UserService::with_session_expiration(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            config.session.expiration_days,
        );
        let tweet_service = TweetService::new(SqlxTweetRepository::boxed(pool));
        let views = ViewRenderer::from_config(&config.views)?;

        Ok(Self {
            user_service: Arc::new(user_service),
            tweet_service: Arc::new(tweet_service),
            views: Arc::new(views),
        })
    }
}

/// Authenticated user for the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// Request-level error
#[derive(Debug)]
pub struct AppError {
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\"><title>Error {code}</title></head>\
             <body><h1>{code}</h1><p>{message}</p><p><a href=\"/tweets\">Back to your tweets</a></p></body></html>",
            code = status.as_u16(),
            message = tera::escape_html(&self.message),
        );
        (status, Html(body)).into_response()
    }
}

/// Session token from `Authorization: Bearer` or the `session` cookie, in that order
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }

    None
}

/// Session guard: unauthenticated requests are redirected to the login page
/// before the handler (and the tweet store) is reached.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_session_token(request.headers()) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match state.user_service.validate_session(&token).await {
        Ok(Some(user)) => {
            request.extensions_mut().insert(CurrentUser(user));
            next.run(request).await
        }
        Ok(None) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => {
            tracing::error!("Session validation failed: {:#}", e);
            AppError::internal_error("Could not verify your session").into_response()
        }
    }
}
