//! Error types for prompt operations

use thiserror::Error;

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// Errors that can occur during prompt operations
#[derive(Error, Debug)]
pub enum PromptError {
    /// Template not registered in the catalog
    #[error("Template '{0}' not registered")]
    TemplateNotRegistered(String),

    /// Template rendering failed
    #[error("Failed to render template '{name}': {detail}")]
    RenderError { name: String, detail: String },

    /// File loading error
    #[error("Failed to load prompt file '{path}': {detail}")]
    FileLoadError { path: String, detail: String },

    /// The document is not a valid prompt catalog
    #[error("Malformed prompt file '{path}': {detail}")]
    Malformed { path: String, detail: String },
}
