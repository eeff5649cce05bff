//! Single-attempt HTTP helper.
//!
//! External calls are never retried: a failed gateway yields an empty
//! category and a failed resolver tier falls through to the next tier.

use crate::GatewayError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Sends a request and parses the response body as JSON.
///
/// # Errors
///
/// * [`GatewayError::Http`] if the request or body read fails
/// * [`GatewayError::Status`] on a non-2xx response
/// * [`GatewayError::Json`] if the body is not valid JSON
#[allow(clippy::future_not_send)]
pub async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, GatewayError> {
    let response = request.send().await?;

    let url = response.url().to_string();
    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Status {
            status: status.as_u16(),
            url,
        });
    }

    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        log::debug!(
            "JSON parse failed\n  \
             url: {url}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {preview}",
            text.len(),
        );
        GatewayError::Json(e)
    })
}
