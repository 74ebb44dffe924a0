//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - validating input before it is stored
//! - turning storage results into typed errors

pub mod password;
pub mod tweet;
pub mod user;

pub use password::{hash_password, verify_password};
pub use tweet::{TweetService, TweetServiceError};
pub use user::{LoginInput, SignupInput, UserService, UserServiceError};
