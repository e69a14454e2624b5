use serde::Deserialize;
use thiserror::Error;

/// Errors from the DiviMate backend boundary.
///
/// `Rejected` carries the backend's own message (bad credentials,
/// duplicate email, validation failures) and is surfaced verbatim.
/// Everything else is a transport or server problem, which the UI words
/// generically so the user knows retrying may help.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Rejected(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 300;

/// Error body shape used by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data.
    /// The cut backs off to a char boundary so multi-byte bodies (e.g. a
    /// proxy's localized HTML error page) cannot panic the slice.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        )
    }

    /// Classify a non-2xx response, extracting the backend's `error`
    /// field when the body carries one.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let backend_message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.error);

        match status.as_u16() {
            400..=499 => ApiError::Rejected(
                backend_message.unwrap_or_else(|| "Something went wrong".to_string()),
            ),
            500..=599 => ApiError::ServerError(
                backend_message.unwrap_or_else(|| Self::truncate_body(body)),
            ),
            _ => ApiError::InvalidResponse(format!(
                "Status {}: {}",
                status,
                Self::truncate_body(body)
            )),
        }
    }

    /// True for failures where retrying without changing input makes
    /// sense (server unreachable, timed out, server fault). Rejections
    /// are not retryable: the input itself was refused.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ApiError::Rejected(_))
    }

    /// Message suitable for direct display to the user.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(msg) => msg.clone(),
            ApiError::Timeout => "Connection timed out. Please try again.".to_string(),
            ApiError::Network(_) => {
                "Unable to reach the server. Check your internet connection.".to_string()
            }
            ApiError::ServerError(_) | ApiError::InvalidResponse(_) => {
                "Something went wrong on the server. Please try again.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_extracts_backend_error() {
        let err = ApiError::from_status(StatusCode::UNAUTHORIZED, r#"{"error":"Invalid credentials"}"#);
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Invalid credentials"));
        assert!(!err.is_transport());
        assert_eq!(err.user_message(), "Invalid credentials");
    }

    #[test]
    fn test_from_status_with_non_json_body() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "<html>oops</html>");
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Something went wrong"));
    }

    #[test]
    fn test_from_status_server_error_is_transport() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, ApiError::ServerError(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(1000);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.len() < long.len());
        assert!(truncated.contains("truncated, 1000 total bytes"));
    }

    #[test]
    fn test_truncate_body_backs_off_multibyte_boundary() {
        // 'é' is two bytes and straddles the 300-byte cut.
        let body = format!("{}é{}", "x".repeat(MAX_ERROR_BODY_LENGTH - 1), "y".repeat(200));
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH - 1)));
        assert!(!truncated.contains('é'));
        assert!(truncated.contains("total bytes"));

        // The same body through a non-JSON 5xx must classify, not panic.
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, &body);
        assert!(matches!(err, ApiError::ServerError(_)));
    }

    #[test]
    fn test_timeout_message_differs_from_rejection() {
        assert_ne!(
            ApiError::Timeout.user_message(),
            ApiError::Rejected("Invalid credentials".to_string()).user_message()
        );
        assert!(ApiError::Timeout.is_transport());
    }
}
