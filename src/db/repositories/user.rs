//! User repository

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{MySql, MySqlPool, Row, Sqlite, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const SELECT_USER: &str = "SELECT id, username, password_hash, created_at FROM users";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let sql = "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)";
        let id = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.as_sqlite().context("SQLite pool unavailable")?;
                sqlx::query(sql)
                    .bind(&user.username)
                    .bind(&user.password_hash)
                    .bind(user.created_at)
                    .execute(pool)
                    .await
                    .context("Failed to create user")?
                    .last_insert_rowid()
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.as_mysql().context("MySQL pool unavailable")?;
                sqlx::query(sql)
                    .bind(&user.username)
                    .bind(&user.password_hash)
                    .bind(user.created_at)
                    .execute(pool)
                    .await
                    .context("Failed to create user")?
                    .last_insert_id() as i64
            }
        };

        Ok(User {
            id,
            ..user.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let sql = format!("{} WHERE id = ?", SELECT_USER);
        let user = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.as_sqlite().context("SQLite pool unavailable")?;
                fetch_user_sqlite(pool, sqlx::query(&sql).bind(id)).await
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.as_mysql().context("MySQL pool unavailable")?;
                fetch_user_mysql(pool, sqlx::query(&sql).bind(id)).await
            }
        };
        user.context("Failed to get user by ID")
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("{} WHERE username = ?", SELECT_USER);
        let user = match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let pool = self.pool.as_sqlite().context("SQLite pool unavailable")?;
                fetch_user_sqlite(pool, sqlx::query(&sql).bind(username)).await
            }
            DatabaseDriver::Mysql => {
                let pool = self.pool.as_mysql().context("MySQL pool unavailable")?;
                fetch_user_mysql(pool, sqlx::query(&sql).bind(username)).await
            }
        };
        user.context("Failed to get user by username")
    }
}

async fn fetch_user_sqlite<'q>(
    pool: &SqlitePool,
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
) -> Result<Option<User>> {
    let row = query.fetch_optional(pool).await?;
    row.as_ref().map(row_to_user_sqlite).transpose()
}

async fn fetch_user_mysql<'q>(
    pool: &MySqlPool,
    query: Query<'q, MySql, MySqlArguments>,
) -> Result<Option<User>> {
    let row = query.fetch_optional(pool).await?;
    row.as_ref().map(row_to_user_mysql).transpose()
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}
