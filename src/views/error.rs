//! View renderer error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    /// Template failed to parse or render
    #[error("Template error: {0}")]
    TemplateError(String),
}
