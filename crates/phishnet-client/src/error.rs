// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PhishNetError>;

#[derive(Debug, Error)]
pub enum PhishNetError {
    #[error("No API key found. Check your environment variables and try again.")]
    MissingApiKey,

    /// The service answered with a non-zero or absent `error_code`.
    #[error("error code {}: {message}", display_code(.code))]
    Api { code: Option<i64>, message: String },

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid response from Phish.net API: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

fn display_code(code: &Option<i64>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "missing".to_string(),
    }
}
