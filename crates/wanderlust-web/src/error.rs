use std::any::Any;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};
use wanderlust_core::{StorageError, Violations};

use crate::views::ErrorTemplate;

pub type Result<T> = std::result::Result<T, AppError>;

/// Message shown when a failure carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum AppError {
    /// The submitted listing failed validation.
    #[error("{0}")]
    Validation(#[from] Violations),
    /// The request body could not be read.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl AppError {
    pub fn listing_not_found() -> Self {
        Self::NotFound("Listing not found".to_string())
    }

    pub fn page_not_found() -> Self {
        Self::NotFound("Page not found".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client. Internal failures only expose the
    /// generic message; their details go to the log.
    fn public_message(&self) -> Option<String> {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::NotFound(_) => {
                Some(self.to_string())
            }
            AppError::Storage(_) | AppError::Render(_) => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = ?self, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        ErrorPage::normalize(Some(status), self.public_message()).into_response()
    }
}

/// A normalized failure, ready to be rendered as the error page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPage {
    pub status: StatusCode,
    pub message: String,
}

impl ErrorPage {
    /// Fills in the defaults for a failure: status 500 and
    /// [`DEFAULT_ERROR_MESSAGE`].
    pub fn normalize(status: Option<StatusCode>, message: Option<String>) -> Self {
        Self {
            status: status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let template = ErrorTemplate {
            status_code: self.status.as_u16(),
            message: self.message,
        };
        match template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(err) => {
                error!("error page rendering failed: {}", err);
                (self.status, template.message).into_response()
            }
        }
    }
}

/// Renders a handler panic as a 500 error page.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = detail, "handler panicked");
    ErrorPage::normalize(None, None).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;
    use wanderlust_core::validate_listing;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn normalize_fills_defaults() {
        let page = ErrorPage::normalize(None, None);
        assert_eq!(page.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(page.message, "Something went wrong");

        let page = ErrorPage::normalize(Some(StatusCode::NOT_FOUND), Some(String::new()));
        assert_eq!(page.status, StatusCode::NOT_FOUND);
        assert_eq!(page.message, "Something went wrong");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        let violations = validate_listing(&json!({})).unwrap_err();
        assert_eq!(
            AppError::from(violations).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::listing_not_found().status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(StorageError::Unavailable("down".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn not_found_renders_message() {
        let response = AppError::page_not_found().into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_text(response).await;
        assert!(body.contains("404"));
        assert!(body.contains("Page not found"));
    }

    #[tokio::test]
    async fn storage_errors_hide_details() {
        let response =
            AppError::from(StorageError::Unavailable("10.0.0.7:27017 refused".to_string()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_text(response).await;
        assert!(body.contains("Something went wrong"));
        assert!(!body.contains("10.0.0.7"));
    }

    #[tokio::test]
    async fn panics_render_default_error_page() {
        let response = handle_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("Something went wrong"));
    }
}
