//! Tweet model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{User, ValidationErrors};

/// Name of the body field, as reported in validation errors
pub const TWEET_FIELD: &str = "tweet";

/// A persisted tweet, as returned by the list query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: i64,
    /// Author's user id
    pub user_id: i64,
    /// Author's username at the time of posting
    pub user_name: String,
    /// Body text, never empty
    pub tweet: String,
    pub created_at: DateTime<Utc>,
}

/// A tweet that has not been saved yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTweet {
    pub user_id: i64,
    pub user_name: String,
    pub tweet: String,
    pub created_at: DateTime<Utc>,
}

impl NewTweet {
    /// Draft a tweet by `author`, stamped with the current time
    pub fn by(author: &User, tweet: impl Into<String>) -> Self {
        Self {
            user_id: author.id,
            user_name: author.username.clone(),
            tweet: tweet.into(),
            created_at: Utc::now(),
        }
    }

    /// Schema checks applied before the record is written.
    ///
    /// A body made only of whitespace counts as missing.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.tweet.trim().is_empty() {
            errors.required(TWEET_FIELD);
        }
        if self.user_name.trim().is_empty() {
            errors.required("user_name");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alice() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_tweet_copies_author() {
        let draft = NewTweet::by(&alice(), "hello");
        assert_eq!(draft.user_id, 1);
        assert_eq!(draft.user_name, "alice");
        assert_eq!(draft.tweet, "hello");
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_empty_body_fails_on_tweet_field() {
        let errors = NewTweet::by(&alice(), "").validate().unwrap_err();
        assert_eq!(errors.message_for(TWEET_FIELD), Some("Path `tweet` is required."));
    }

    #[test]
    fn test_missing_author_name_fails_on_other_field() {
        let mut author = alice();
        author.username.clear();
        let errors = NewTweet::by(&author, "hello").validate().unwrap_err();
        assert!(errors.message_for(TWEET_FIELD).is_none());
        assert!(errors.message_for("user_name").is_some());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_whitespace_only_body_is_rejected(body in "[ \t\n]{0,20}") {
            let errors = NewTweet::by(&alice(), body).validate().unwrap_err();
            prop_assert!(errors.message_for(TWEET_FIELD).is_some());
        }

        #[test]
        fn prop_body_with_visible_text_is_accepted(
            pad in "[ \t]{0,5}",
            text in "[a-zA-Z0-9!?.,]{1,140}",
        ) {
            let body = format!("{pad}{text}{pad}");
            prop_assert!(NewTweet::by(&alice(), body).validate().is_ok());
        }
    }
}
