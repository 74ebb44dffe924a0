//! Tweeter - a small session-authenticated tweet feed
//!
//! Signed-in users list their own tweets, newest first, and post new ones
//! through a server-rendered form.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod views;
