use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::config::{is_well_formed_token, Config};

fn reject(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "error": error,
            "message": message,
        })
        .to_string(),
    )
        .into_response()
}

/// Authentication middleware for the JSON API.
///
/// Expects `Authorization: Bearer <token>` and compares the token with the
/// configured `API_TOKENS`. Tokens must be at least 32 characters of
/// alphanumerics, hyphens and underscores.
pub async fn auth_middleware(
    State(config): State<Arc<Config>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Missing Authorization header. Please provide a Bearer token.",
        );
    };

    let Ok(auth_str) = auth_header.to_str() else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Invalid Authorization header format.",
        );
    };

    let Some(provided_token) = auth_str.strip_prefix("Bearer ").map(str::trim) else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Authorization header must use Bearer scheme (e.g., 'Authorization: Bearer <token>').",
        );
    };

    if !is_well_formed_token(provided_token) {
        return reject(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid token format.");
    }

    if config.api_tokens.is_empty() {
        tracing::error!("API_TOKENS is not configured; rejecting API request");
        return reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Authentication is not properly configured on the server.",
        );
    }

    if !config.api_tokens.iter().any(|t| t == provided_token) {
        return reject(StatusCode::UNAUTHORIZED, "Unauthorized", "Invalid or expired token.");
    }

    next.run(request).await
}
