//! Error types and result aliases for glimpse.
//!
//! Every failure the tool can hit is a variant of [`GlimpseError`]. None of them
//! are recovered from: the binary prints the error to stderr and exits with
//! [`GlimpseError::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlimpseError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Image file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported image format '{0}'. Please use JPG or PNG.")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error calling OpenRouter API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("OpenRouter API error: status {status}")]
    Api { status: u16, body: String },

    #[error("Malformed response from OpenRouter API: {0}")]
    MalformedResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GlimpseError {
    /// Process exit status for this error. All failures are terminal.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Lines written to stderr when the process aborts with this error.
    pub fn diagnostic(&self) -> String {
        match self {
            GlimpseError::Api { status, body } => format!(
                "Error: {}\nResponse status code: {}\nResponse body: {}",
                self, status, body
            ),
            _ => format!("Error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, GlimpseError>;
