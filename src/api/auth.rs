//! Login, signup and logout pages
//!
//! A successful login or signup sets the `session` cookie and redirects to
//! the tweets list. Logout deletes the session and clears the cookie.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::api::middleware::{extract_session_token, AppError, AppState, LOGIN_PATH};
use crate::api::{page_context, render};
use crate::api::tweets::LIST_PATH;
use crate::models::Session;
use crate::services::{LoginInput, SignupInput, UserServiceError};

const CLEAR_COOKIE: &str = "session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

/// Fields shared by the login and signup forms
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/signup", get(signup_form).post(signup))
        .route("/logout", post(logout))
}

async fn login_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, "auth/login.html", &page_context(None)).map(Html)
}

async fn signup_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, "auth/signup.html", &page_context(None)).map(Html)
}

/// POST /login
async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    match state
        .user_service
        .login(LoginInput::new(form.username.clone(), form.password))
        .await
    {
        Ok(session) => Ok(signed_in_redirect(&session)),
        Err(e) => rejected(&state, "auth/login.html", &form.username, e),
    }
}

/// POST /signup
async fn signup(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let password = form.password.clone();
    let user = match state
        .user_service
        .signup(SignupInput::new(form.username.clone(), form.password))
        .await
    {
        Ok(user) => user,
        Err(e) => return rejected(&state, "auth/signup.html", &form.username, e),
    };

    match state
        .user_service
        .login(LoginInput::new(user.username, password))
        .await
    {
        Ok(session) => Ok(signed_in_redirect(&session)),
        Err(e) => rejected(&state, "auth/signup.html", &form.username, e),
    }
}

/// POST /logout
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_session_token(&headers) {
        if let Err(e) = state.user_service.logout(&token).await {
            tracing::warn!("Failed to delete session on logout: {:#}", e);
        }
    }

    ([(header::SET_COOKIE, CLEAR_COOKIE)], Redirect::to(LOGIN_PATH)).into_response()
}

fn signed_in_redirect(session: &Session) -> Response {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id,
        session.max_age_seconds()
    );
    ([(header::SET_COOKIE, cookie)], Redirect::to(LIST_PATH)).into_response()
}

/// Re-render a credentials form with the failure message
fn rejected(
    state: &AppState,
    template: &str,
    username: &str,
    error: UserServiceError,
) -> Result<Response, AppError> {
    let status = match &error {
        UserServiceError::InternalError(e) => {
            tracing::error!("{} failed: {:#}", template, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::OK,
    };

    let mut ctx = page_context(None);
    ctx.insert("errorMessage", &error.user_message());
    ctx.insert("username", username);
    let body = render(state, template, &ctx)?;
    Ok((status, Html(body)).into_response())
}
