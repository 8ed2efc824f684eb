use askama::Template;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::forms::ValidationErrors;

/// Error type shared by the JSON API, the admin pages and the workflow actions.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("The given data was invalid.")]
    Validation(ValidationErrors),
    #[error("The {0} action is disabled for this record.")]
    ActionDisabled(&'static str),
    #[error("The {0} action requires confirmation.")]
    ConfirmationRequired(&'static str),
    #[error("No records were selected.")]
    EmptySelection,
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Template(#[from] askama::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::EmptySelection => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ActionDisabled(_) | AppError::ConfirmationRequired(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Multipart(e) => e.status(),
            AppError::Database(_) | AppError::Template(_) | AppError::Io(_) | AppError::Csv(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "Not Found",
            AppError::Validation(_) => "Validation Failed",
            AppError::ActionDisabled(_) => "Action Disabled",
            AppError::ConfirmationRequired(_) => "Confirmation Required",
            AppError::EmptySelection => "Empty Selection",
            AppError::BadRequest(_) | AppError::Json(_) => "Bad Request",
            AppError::Multipart(_) => "Invalid Upload",
            AppError::Database(sqlx::Error::RowNotFound) => "Not Found",
            AppError::Database(_) | AppError::Template(_) | AppError::Io(_) | AppError::Csv(_) => {
                "Internal Server Error"
            }
        }
    }

    /// Message safe to show to users; internal failures are not echoed back.
    fn public_message(&self) -> String {
        if self.status().is_server_error() {
            String::from("The request could not be completed. Nothing was saved.")
        } else {
            self.to_string()
        }
    }

    fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!("Request failed: {:?}", self);
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let mut body = json!({
            "error": self.kind(),
            "message": self.public_message(),
        });
        if let AppError::Validation(errors) = &self {
            body["errors"] = json!(errors);
        }
        (status, Json(body)).into_response()
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    title: String,
    message: String,
}

/// Wrapper that renders an [`AppError`] as an admin HTML page.
#[derive(Debug)]
pub struct HtmlError(pub AppError);

impl<E> From<E> for HtmlError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        HtmlError(err.into())
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();
        let status = err.status();
        let template = ErrorTemplate {
            status: status.as_u16(),
            title: err.kind().to_string(),
            message: err.public_message(),
        };
        match template.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Template error: {}", e);
                (status, err.public_message()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("Talk").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::ActionDisabled("approve").status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::EmptySelection.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_are_not_echoed() {
        let err = AppError::Database(sqlx::Error::PoolTimedOut);
        assert!(!err.public_message().contains("pool"));
        assert_eq!(
            AppError::NotFound("Speaker").public_message(),
            "Speaker not found"
        );
    }
}
