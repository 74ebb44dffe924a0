//! Data models
//!
//! - Database entities (User, Session, Tweet)
//! - Write-side inputs (NewTweet) and their validation errors

mod session;
mod tweet;
mod user;
mod validation;

pub use session::Session;
pub use tweet::{NewTweet, Tweet, TWEET_FIELD};
pub use validation::{FieldError, ValidationErrors};
pub use user::User;
