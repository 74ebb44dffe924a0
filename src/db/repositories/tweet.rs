//! Tweet repository
//!
//! - `TweetRepository` trait: the tweet store contract
//! - `SqlxTweetRepository` implementing it for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{NewTweet, Tweet};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Tweet store
#[async_trait]
pub trait TweetRepository: Send + Sync {
    /// Insert a tweet and return the stored record
    async fn create(&self, tweet: &NewTweet) -> Result<Tweet>;

    /// All tweets whose `user_name` matches, newest first
    async fn find_by_user_name(&self, user_name: &str) -> Result<Vec<Tweet>>;
}

pub struct SqlxTweetRepository {
    pool: DynDatabasePool,
}

impl SqlxTweetRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn TweetRepository> {
        Arc::new(Self::new(pool))
    }

    fn sqlite(&self) -> Result<&SqlitePool> {
        self.pool.as_sqlite().context("SQLite pool unavailable")
    }

    fn mysql(&self) -> Result<&MySqlPool> {
        self.pool.as_mysql().context("MySQL pool unavailable")
    }
}

#[async_trait]
impl TweetRepository for SqlxTweetRepository {
    async fn create(&self, tweet: &NewTweet) -> Result<Tweet> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_tweet_sqlite(self.sqlite()?, tweet).await,
            DatabaseDriver::Mysql => create_tweet_mysql(self.mysql()?, tweet).await,
        }
    }

    async fn find_by_user_name(&self, user_name: &str) -> Result<Vec<Tweet>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_by_user_name_sqlite(self.sqlite()?, user_name).await,
            DatabaseDriver::Mysql => find_by_user_name_mysql(self.mysql()?, user_name).await,
        }
    }
}

// Projection: only the columns the list view needs. Ties on created_at fall
// back to insertion order so the listing is stable.
const FIND_BY_USER_NAME: &str = r#"
    SELECT id, tweet, user_name, user_id, created_at
    FROM tweets
    WHERE user_name = ?
    ORDER BY created_at DESC, id DESC
"#;

const INSERT_TWEET: &str = r#"
    INSERT INTO tweets (user_id, user_name, tweet, created_at)
    VALUES (?, ?, ?, ?)
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_tweet_sqlite(pool: &SqlitePool, tweet: &NewTweet) -> Result<Tweet> {
    let result = sqlx::query(INSERT_TWEET)
        .bind(tweet.user_id)
        .bind(&tweet.user_name)
        .bind(&tweet.tweet)
        .bind(tweet.created_at)
        .execute(pool)
        .await
        .context("Failed to create tweet")?;

    Ok(saved(result.last_insert_rowid(), tweet))
}

async fn find_by_user_name_sqlite(pool: &SqlitePool, user_name: &str) -> Result<Vec<Tweet>> {
    let rows = sqlx::query(FIND_BY_USER_NAME)
        .bind(user_name)
        .fetch_all(pool)
        .await
        .context("Failed to list tweets")?;

    rows.iter().map(row_to_tweet_sqlite).collect()
}

fn row_to_tweet_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Tweet> {
    Ok(Tweet {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        tweet: row.try_get("tweet")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_tweet_mysql(pool: &MySqlPool, tweet: &NewTweet) -> Result<Tweet> {
    let result = sqlx::query(INSERT_TWEET)
        .bind(tweet.user_id)
        .bind(&tweet.user_name)
        .bind(&tweet.tweet)
        .bind(tweet.created_at)
        .execute(pool)
        .await
        .context("Failed to create tweet")?;

    Ok(saved(result.last_insert_id() as i64, tweet))
}

async fn find_by_user_name_mysql(pool: &MySqlPool, user_name: &str) -> Result<Vec<Tweet>> {
    let rows = sqlx::query(FIND_BY_USER_NAME)
        .bind(user_name)
        .fetch_all(pool)
        .await
        .context("Failed to list tweets")?;

    rows.iter().map(row_to_tweet_mysql).collect()
}

fn row_to_tweet_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Tweet> {
    Ok(Tweet {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        user_name: row.try_get("user_name")?,
        tweet: row.try_get("tweet")?,
        created_at: row.try_get("created_at")?,
    })
}

fn saved(id: i64, tweet: &NewTweet) -> Tweet {
    Tweet {
        id,
        user_id: tweet.user_id,
        user_name: tweet.user_name.clone(),
        tweet: tweet.tweet.clone(),
        created_at: tweet.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, Utc};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxTweetRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        for name in ["alice", "bob"] {
            pool.execute(&format!(
                "INSERT INTO users (username, password_hash) VALUES ('{}', 'hash')",
                name
            ))
            .await
            .expect("Failed to create user");
        }
        let repo = SqlxTweetRepository::new(pool.clone());
        (pool, repo)
    }

    fn draft(user_id: i64, user_name: &str, body: &str, minutes_ago: i64) -> NewTweet {
        NewTweet {
            user_id,
            user_name: user_name.to_string(),
            tweet: body.to_string(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_create_tweet() {
        let (_pool, repo) = setup_test_repo().await;

        let tweet = repo
            .create(&draft(1, "alice", "hello", 0))
            .await
            .expect("Failed to create tweet");

        assert!(tweet.id > 0);
        assert_eq!(tweet.user_id, 1);
        assert_eq!(tweet.user_name, "alice");
        assert_eq!(tweet.tweet, "hello");
        assert_eq!(repo.find_by_user_name("alice").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_user_name_filters_and_sorts() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create(&draft(1, "alice", "oldest", 30)).await.unwrap();
        repo.create(&draft(2, "bob", "not mine", 20)).await.unwrap();
        repo.create(&draft(1, "alice", "newest", 1)).await.unwrap();
        repo.create(&draft(1, "alice", "middle", 10)).await.unwrap();

        let tweets = repo.find_by_user_name("alice").await.unwrap();
        let bodies: Vec<&str> = tweets.iter().map(|t| t.tweet.as_str()).collect();

        assert_eq!(bodies, vec!["newest", "middle", "oldest"]);
        assert!(tweets.iter().all(|t| t.user_name == "alice"));
    }

    #[tokio::test]
    async fn test_find_by_user_name_roundtrips_fields() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo.create(&draft(2, "bob", "hi there", 5)).await.unwrap();
        let found = repo.find_by_user_name("bob").await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, created.id);
        assert_eq!(found[0].user_id, 2);
        assert_eq!(found[0].tweet, "hi there");
        assert_eq!(found[0].created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_find_by_unknown_user_is_empty() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&draft(1, "alice", "hello", 0)).await.unwrap();

        assert!(repo.find_by_user_name("carol").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_timestamp_keeps_insertion_order_reversed() {
        let (_pool, repo) = setup_test_repo().await;
        let at = Utc::now();

        for body in ["first", "second"] {
            let mut t = draft(1, "alice", body, 0);
            t.created_at = at;
            repo.create(&t).await.unwrap();
        }

        let tweets = repo.find_by_user_name("alice").await.unwrap();
        assert_eq!(tweets[0].tweet, "second");
        assert_eq!(tweets[1].tweet, "first");
    }

    #[tokio::test]
    async fn test_store_rejects_empty_body() {
        let (_pool, repo) = setup_test_repo().await;
        assert!(repo.create(&draft(1, "alice", "", 0)).await.is_err());
        assert!(repo.find_by_user_name("alice").await.unwrap().is_empty());
    }
}
