use astroai_core::AstroError;
use reqwest::{StatusCode, header::HeaderValue};
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Detailed { message: String },
    Plain(String),
}

/// Converts a non-success response into an upstream error.
pub(crate) fn map_http_error(
    service: &str,
    status: StatusCode,
    body: String,
    retry_after: Option<Duration>,
) -> AstroError {
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| match wrapper.error {
            ErrorBody::Detailed { message } | ErrorBody::Plain(message) => message,
        })
        .unwrap_or(body);

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    let mut message = format!("{service}: {detail}");
    if let Some(delay) = retry_after {
        message.push_str(&format!(" (retry after {}s)", delay.as_secs()));
    }

    AstroError::upstream(Some(status.as_u16()), message, is_retryable)
}

/// Converts a transport failure (DNS, connect, timeout, ...) into an
/// upstream error.
pub(crate) fn map_transport_error(service: &str, err: reqwest::Error) -> AstroError {
    AstroError::upstream(
        None,
        format!("{service} request failed: {err}"),
        err.is_connect() || err.is_timeout(),
    )
}

pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
