use reqwest::StatusCode;
use thiserror::Error;

/// Shown when the provider answers with an error status but no usable message.
pub const FALLBACK_PROVIDER_MESSAGE: &str = "Error fetching data";

const GENERIC_FAILURE_MESSAGE: &str = "Failed to fetch weather. Check the logs for details.";
const NOT_FOUND_MESSAGE: &str = "City not found. Please check the spelling.";
const BAD_CREDENTIAL_MESSAGE: &str = "Invalid API key. Please check your key and try again.";

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Please enter a city name.")]
    EmptyCity,

    #[error("{message}")]
    Provider { status: StatusCode, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Decode(#[from] serde_json::Error),

    #[error("failed to render weather fragment")]
    Render(#[from] std::fmt::Error),
}

impl WeatherError {
    /// The single line of text a user sees for this failure.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::EmptyCity => self.to_string(),
            other => FailureKind::classify(&other.to_string()).user_message(),
        }
    }
}

/// Coarse outcome of a failed lookup, derived from the error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    BadCredential,
    Other(String),
}

impl FailureKind {
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();

        if lower.contains("city not found") {
            FailureKind::NotFound
        } else if lower.contains("invalid api key") {
            FailureKind::BadCredential
        } else {
            FailureKind::Other(message.to_string())
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            FailureKind::NotFound => NOT_FOUND_MESSAGE.to_string(),
            FailureKind::BadCredential => BAD_CREDENTIAL_MESSAGE.to_string(),
            FailureKind::Other(message) if message.is_empty() => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            FailureKind::Other(message) => capitalize_first(message),
        }
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
