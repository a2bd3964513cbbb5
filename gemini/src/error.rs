use std::fmt;

use serde::Deserialize;

/// Errors raised by the Gemini backend.
#[derive(Debug)]
pub enum GeminiError {
    /// HTTP transport errors.
    Http(reqwest::Error),
    /// Non-success HTTP status with the raw response body.
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, usually a Google error envelope.
        body: String,
    },
    /// JSON serialization/deserialization problems.
    Json(serde_json::Error),
    /// API level errors such as a blocked prompt or a missing candidate.
    Api(String),
    /// SSE stream parsing errors.
    Parse(String),
    /// Rate limit exceeded (includes retry delay if available).
    RateLimit {
        /// Friendly message extracted from the error envelope.
        message: String,
        /// Suggested delay before retrying.
        retry_after_secs: Option<u64>,
    },
}

/// Gemini API error response structure.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: Option<String>,
    pub status: Option<String>,
    pub details: Option<Vec<ApiErrorInfo>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiErrorInfo {
    RetryInfo(RetryInfoDetail),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
pub(crate) struct RetryInfoDetail {
    #[serde(rename = "retryDelay")]
    pub retry_delay: String,
}

impl ApiErrorResponse {
    /// Extract a user-friendly message from the error response.
    pub fn friendly_message(&self) -> String {
        let Some(error) = &self.error else {
            return "Unknown API error".to_string();
        };

        error.message.clone().unwrap_or_else(|| {
            error
                .status
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string())
        })
    }

    /// Extract retry delay in seconds from the error response.
    pub fn retry_delay_secs(&self) -> Option<u64> {
        let details = self.error.as_ref()?.details.as_ref()?;
        details.iter().find_map(|detail| match detail {
            // "20s" format
            ApiErrorInfo::RetryInfo(info) => info.retry_delay.trim_end_matches('s').parse().ok(),
            ApiErrorInfo::Other(_) => None,
        })
    }
}

impl fmt::Display for GeminiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "{}", transport_message(err)),
            Self::Status { status, body } => write!(f, "{}", status_message(*status, body)),
            Self::Json(err) => write!(f, "Invalid response format: {err}"),
            Self::Api(message) => write!(f, "{message}"),
            Self::Parse(message) => write!(f, "Parse error: {message}"),
            Self::RateLimit {
                message,
                retry_after_secs,
            } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "{message} (retry after {secs}s)")
                } else {
                    write!(f, "{message}")
                }
            }
        }
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_connect() {
        return "Network connection failed - check your internet connection".to_string();
    }
    if err.is_timeout() {
        return "Request timed out - please try again".to_string();
    }
    err.to_string()
}

/// Prefer the message from the Google error envelope, fall back to status-based text.
fn status_message(status: u16, body: &str) -> String {
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(body) {
        if api_error.error.is_some() {
            return api_error.friendly_message();
        }
    }

    match status {
        400 => "Invalid request".to_string(),
        401 => "Authentication failed - check your API key".to_string(),
        403 => "Access denied - check your API key permissions".to_string(),
        404 => "Model not found".to_string(),
        429 => "Rate limit exceeded - please wait before retrying".to_string(),
        500 => "Server error - please try again".to_string(),
        502..=504 => "Service temporarily unavailable - please try again".to_string(),
        _ => format!("HTTP error {status}"),
    }
}

impl std::error::Error for GeminiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl GeminiError {
    /// Check if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_connect() || err.is_timeout(),
            Self::Status { status, .. } => *status == 408 || *status >= 500,
            Self::RateLimit { .. } => true,
            _ => false,
        }
    }

    /// Get suggested retry delay in seconds.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimit {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }

    /// Build an error from a non-success status, detecting rate limits.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        if status == 429 {
            let parsed = serde_json::from_str::<ApiErrorResponse>(&body).ok();
            return Self::RateLimit {
                message: parsed.as_ref().map_or_else(
                    || "Rate limit exceeded".to_string(),
                    ApiErrorResponse::friendly_message,
                ),
                retry_after_secs: parsed.as_ref().and_then(ApiErrorResponse::retry_delay_secs),
            };
        }
        Self::Status { status, body }
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(value: reqwest::Error) -> Self {
        // the URL may carry the API key
        Self::Http(value.without_url())
    }
}

impl From<serde_json::Error> for GeminiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTA_BODY: &str = r#"{
        "error": {
            "code": 429,
            "message": "Resource has been exhausted",
            "status": "RESOURCE_EXHAUSTED",
            "details": [
                {"@type": "type.googleapis.com/google.rpc.Help", "links": []},
                {"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "20s"}
            ]
        }
    }"#;

    #[test]
    fn rate_limits_carry_retry_delay() {
        let err = GeminiError::from_status(429, QUOTA_BODY.to_string());
        assert!(err.is_retryable());
        assert_eq!(err.retry_delay_secs(), Some(20));
        assert_eq!(
            err.to_string(),
            "Resource has been exhausted (retry after 20s)"
        );
    }

    #[test]
    fn status_uses_envelope_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let err = GeminiError::from_status(400, body.to_string());
        assert_eq!(err.to_string(), "API key not valid.");
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_falls_back_to_code_text() {
        let err = GeminiError::from_status(503, "<html>oops</html>".to_string());
        assert_eq!(
            err.to_string(),
            "Service temporarily unavailable - please try again"
        );
        assert!(err.is_retryable());
    }
}
