//! Tweet service
//!
//! The write path validates a draft against the tweet schema before it
//! reaches the repository. Rejections come back tagged, so callers can tell
//! field validation apart from storage failures.

use crate::db::repositories::TweetRepository;
use crate::models::{NewTweet, Tweet, User, ValidationErrors};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum TweetServiceError {
    /// One or more fields failed schema validation
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The store could not be reached or refused the write
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub struct TweetService {
    repo: Arc<dyn TweetRepository>,
}

impl TweetService {
    pub fn new(repo: Arc<dyn TweetRepository>) -> Self {
        Self { repo }
    }

    /// Tweets posted under `user`'s username, newest first
    pub async fn list_for(&self, user: &User) -> Result<Vec<Tweet>, TweetServiceError> {
        Ok(self.repo.find_by_user_name(&user.username).await?)
    }

    /// Post `text` as `author`
    pub async fn create(&self, author: &User, text: &str) -> Result<Tweet, TweetServiceError> {
        let draft = NewTweet::by(author, text);
        draft.validate().map_err(TweetServiceError::Validation)?;

        let tweet = self.repo.create(&draft).await?;
        tracing::debug!(tweet_id = tweet.id, user_id = tweet.user_id, "Tweet created");
        Ok(tweet)
    }
}
