//! Tweets pages
//!
//! - GET  /tweets      - the signed-in user's tweets, newest first
//! - GET  /tweets/new  - composition form
//! - POST /tweets      - post a tweet
//!
//! Every route sits behind `require_session`.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::api::middleware::{AppError, AppState, CurrentUser};
use crate::api::{page_context, render};
use crate::models::TWEET_FIELD;
use crate::services::TweetServiceError;

pub const LIST_PATH: &str = "/tweets";

/// Shown when a rejection carries no message for the tweet field
const GENERIC_SAVE_ERROR: &str = "Your tweet could not be saved.";

/// Body of the composition form
#[derive(Debug, Deserialize)]
pub struct TweetForm {
    #[serde(rename = "tweetText", default)]
    pub tweet_text: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tweets", get(list_tweets).post(create_tweet))
        .route("/tweets/", get(list_tweets).post(create_tweet))
        .route("/tweets/new", get(new_tweet_form))
}

/// GET /tweets
async fn list_tweets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    let tweets = state.tweet_service.list_for(&user).await.map_err(|e| {
        tracing::error!(user_id = user.id, "Failed to list tweets: {:#}", e);
        AppError::internal_error("Could not load your tweets")
    })?;

    let mut ctx = page_context(Some(&user));
    ctx.insert("tweets", &tweets);
    render(&state, "tweets/index.html", &ctx).map(Html)
}

/// GET /tweets/new
async fn new_tweet_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Html<String>, AppError> {
    render(&state, "tweets/new.html", &page_context(Some(&user))).map(Html)
}

/// POST /tweets
async fn create_tweet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<TweetForm>,
) -> Result<Response, AppError> {
    let (status, message) = match state.tweet_service.create(&user, &form.tweet_text).await {
        Ok(_) => return Ok(Redirect::to(LIST_PATH).into_response()),
        Err(TweetServiceError::Validation(errors)) => {
            let message = errors
                .message_for(TWEET_FIELD)
                .unwrap_or(GENERIC_SAVE_ERROR)
                .to_string();
            (StatusCode::OK, message)
        }
        Err(TweetServiceError::Internal(e)) => {
            tracing::error!(user_id = user.id, "Failed to save tweet: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_SAVE_ERROR.to_string())
        }
    };

    let mut ctx = page_context(Some(&user));
    ctx.insert("errorMessage", &message);
    let body = render(&state, "tweets/new.html", &ctx)?;
    Ok((status, Html(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{cookie, signed_in, test_app};
    use crate::db::repositories::{
        SessionRepository, SqlxSessionRepository, SqlxTweetRepository, SqlxUserRepository,
        TweetRepository, UserRepository,
    };
    use crate::db::DatabasePool;
    use crate::models::{NewTweet, Session, Tweet};
    use crate::services::TweetService;
    use async_trait::async_trait;
    use axum::http::{header, HeaderValue};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    const NO_FIELDS: &[(&str, &str)] = &[];

    #[tokio::test]
    async fn test_guard_redirects_every_route_to_login() {
        let app = test_app().await;

        for response in [
            app.server.get("/tweets").await,
            app.server.get("/tweets/").await,
            app.server.get("/tweets/new").await,
            app.server.post("/tweets").form(&[("tweetText", "hi")]).await,
        ] {
            assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
            assert_eq!(response.header(header::LOCATION), "/login");
        }
    }

    #[tokio::test]
    async fn test_unknown_token_redirects_and_creates_nothing() {
        let app = test_app().await;
        let (alice, _token) = signed_in(&app.state, "alice").await;

        let response = app
            .server
            .post("/tweets")
            .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-session"))
            .form(&[("tweetText", "sneaky")])
            .await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/login");
        assert!(app.state.tweet_service.list_for(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_hello_creates_record_and_redirects() {
        let app = test_app().await;
        let (alice, token) = signed_in(&app.state, "alice").await;

        let response = app
            .server
            .post("/tweets")
            .add_header(header::COOKIE, cookie(&token))
            .form(&[("tweetText", "hello")])
            .await;

        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header(header::LOCATION), "/tweets");

        let stored = app.state.tweet_service.list_for(&alice).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, alice.id);
        assert_eq!(stored[0].user_name, "alice");
        assert_eq!(stored[0].tweet, "hello");

        let listing = app
            .server
            .get("/tweets")
            .add_header(header::COOKIE, cookie(&token))
            .await;
        assert_eq!(listing.status_code(), StatusCode::OK);
        assert!(listing.text().contains("hello"));
    }

    #[tokio::test]
    async fn test_post_empty_rerenders_form_with_field_message() {
        let app = test_app().await;
        let (alice, token) = signed_in(&app.state, "alice").await;

        let response = app
            .server
            .post("/tweets")
            .add_header(header::COOKIE, cookie(&token))
            .form(&[("tweetText", "")])
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.text();
        assert!(body.contains("class=\"error\""));
        assert!(body.contains("Path `tweet` is required."));
        assert!(app.state.tweet_service.list_for(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_field_counts_as_empty() {
        let app = test_app().await;
        let (alice, token) = signed_in(&app.state, "alice").await;

        let response = app
            .server
            .post("/tweets")
            .add_header(header::COOKIE, cookie(&token))
            .form(NO_FIELDS)
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().contains("Path `tweet` is required."));
        assert!(app.state.tweet_service.list_for(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_shows_only_own_tweets_newest_first() {
        let app = test_app().await;
        let (alice, token) = signed_in(&app.state, "alice").await;
        let (bob, _) = signed_in(&app.state, "bob").await;

        let repo = SqlxTweetRepository::new(app.pool.clone());
        let now = Utc::now();
        for (author, text, age) in [
            (&alice, "older from alice", Duration::hours(2)),
            (&alice, "newer from alice", Duration::minutes(1)),
            (&bob, "from bob", Duration::seconds(5)),
        ] {
            let mut draft = NewTweet::by(author, text);
            draft.created_at = now - age;
            repo.create(&draft).await.unwrap();
        }

        let body = app
            .server
            .get("/tweets")
            .add_header(header::COOKIE, cookie(&token))
            .await
            .text();

        let newer = body.find("newer from alice").expect("newer tweet listed");
        let older = body.find("older from alice").expect("older tweet listed");
        assert!(newer < older);
        assert!(!body.contains("from bob"));
        assert!(body.contains("2 hours ago"));
    }

    #[tokio::test]
    async fn test_list_empty_state_and_form() {
        let app = test_app().await;
        let (_alice, token) = signed_in(&app.state, "alice").await;

        let listing = app.server.get("/tweets/").add_header(header::COOKIE, cookie(&token)).await;
        assert_eq!(listing.status_code(), StatusCode::OK);
        assert!(listing.text().contains("No tweets yet"));

        let form = app.server.get("/tweets/new").add_header(header::COOKIE, cookie(&token)).await;
        assert_eq!(form.status_code(), StatusCode::OK);
        let body = form.text();
        assert!(body.contains("name=\"tweetText\""));
        assert!(!body.contains("class=\"error\""));
    }

    #[tokio::test]
    async fn test_rejection_on_other_field_uses_generic_message() {
        let app = test_app().await;
        app.pool
            .execute("INSERT INTO users (username, password_hash) VALUES ('   ', 'hash')")
            .await
            .unwrap();
        let blank = SqlxUserRepository::new(app.pool.clone())
            .get_by_username("   ")
            .await
            .unwrap()
            .expect("user inserted");
        let session = Session::start(blank.id, Duration::days(1)).unwrap();
        SqlxSessionRepository::new(app.pool.clone()).create(&session).await.unwrap();

        let response = app
            .server
            .post("/tweets")
            .add_header(header::COOKIE, cookie(&session.id))
            .form(&[("tweetText", "hello")])
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.text();
        assert!(body.contains(GENERIC_SAVE_ERROR));
        assert!(!body.contains("Path `user_name` is required."));
        assert!(app.state.tweet_service.list_for(&blank).await.unwrap().is_empty());
    }

    struct BrokenStore;

    #[async_trait]
    impl TweetRepository for BrokenStore {
        async fn create(&self, _tweet: &NewTweet) -> anyhow::Result<Tweet> {
            anyhow::bail!("disk I/O error")
        }

        async fn find_by_user_name(&self, _user_name: &str) -> anyhow::Result<Vec<Tweet>> {
            anyhow::bail!("disk I/O error")
        }
    }

    #[tokio::test]
    async fn test_store_failure_is_a_server_error_not_a_crash() {
        let app = test_app().await;
        let (_alice, token) = signed_in(&app.state, "alice").await;

        let mut state = app.state.clone();
        state.tweet_service = Arc::new(TweetService::new(Arc::new(BrokenStore)));
        let server = axum_test::TestServer::new(crate::api::build_router(state)).unwrap();

        let create = server
            .post("/tweets")
            .add_header(header::COOKIE, cookie(&token))
            .form(&[("tweetText", "hello")])
            .await;
        assert_eq!(create.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(create.text().contains(GENERIC_SAVE_ERROR));

        let list = server.get("/tweets").add_header(header::COOKIE, cookie(&token)).await;
        assert_eq!(list.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
