use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

const MAX_BODY_IN_MESSAGE: usize = 200;

pub fn build_client(service: &'static str, timeout: Duration) -> ApiResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ApiError::Transport { service, source })
}

/// Send the request and turn any non-success status into `ApiError::Status`.
pub async fn send(service: &'static str, request: RequestBuilder) -> ApiResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|source| ApiError::Transport { service, source })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        service,
        status: status.as_u16(),
        message: status_message(status, &body),
    })
}

pub async fn send_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
) -> ApiResult<T> {
    send(service, request)
        .await?
        .json()
        .await
        .map_err(|source| ApiError::Decode { service, source })
}

fn status_message(status: StatusCode, body: &str) -> String {
    let phrase = status.canonical_reason().unwrap_or("Unknown Status");
    let body = body.trim();
    if body.is_empty() {
        return phrase.to_string();
    }
    let snippet: String = body.chars().take(MAX_BODY_IN_MESSAGE).collect();
    format!("{phrase}: {snippet}")
}
