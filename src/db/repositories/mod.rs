//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the queries for one entity.

pub mod session;
pub mod tweet;
pub mod user;

pub use session::{SessionRepository, SqlxSessionRepository};
pub use tweet::{SqlxTweetRepository, TweetRepository};
pub use user::{SqlxUserRepository, UserRepository};
