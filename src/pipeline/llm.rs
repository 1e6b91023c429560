//! VLM interaction: build the multimodal request and call the provider.
//!
//! This module is intentionally thin — the instruction text lives in
//! [`crate::prompts`] and the reply parsing in [`crate::record`], so the only
//! concern here is the wire exchange: one request, one reply, no retry and no
//! caching (every invocation is a fresh call, even for identical photos).
//!
//! The request follows the OpenAI chat-completion shape with
//! `response_format: {"type": "json_object"}` so the reply is constrained to
//! a single JSON object.

use crate::config::ExtractionConfig;
use crate::error::FichaError;
use crate::pipeline::encode::EncodedImage;
use crate::prompts::EXTRACTION_PROMPT;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Build the single user message: the fixed instruction followed by one
/// image block per photo, in upload order.
fn build_content(images: &[EncodedImage]) -> Vec<Value> {
    let mut content = vec![json!({"type": "text", "text": EXTRACTION_PROMPT})];
    for img in images {
        content.push(json!({
            "type": "image_url",
            "image_url": {"url": img.data_uri()}
        }));
    }
    content
}

/// Build the full request body for the chat-completion endpoint.
fn build_request_body(config: &ExtractionConfig, images: &[EncodedImage]) -> Value {
    json!({
        "model": config.model,
        "messages": [{"role": "user", "content": build_content(images)}],
        "response_format": {"type": "json_object"},
        "max_tokens": config.max_tokens,
        "temperature": config.temperature,
    })
}

/// Issue the extraction call and return the raw reply text.
///
/// The connection is scoped to this one call: the client is built here and
/// dropped on return. Error mapping:
///
/// * transport failure (DNS, TLS, timeout) → [`FichaError::ExtractionFailed`]
/// * HTTP 401/403 → [`FichaError::AuthRejected`]
/// * HTTP 429 → [`FichaError::QuotaExceeded`]
/// * other non-2xx → [`FichaError::ApiError`]
/// * 2xx without a usable `choices[0].message.content` → [`FichaError::MalformedReply`]
pub async fn request_extraction(
    config: &ExtractionConfig,
    api_key: &str,
    images: &[EncodedImage],
) -> Result<String, FichaError> {
    let start = Instant::now();
    let url = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));
    let body = build_request_body(config, images);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api_timeout_secs))
        .build()
        .map_err(|e| FichaError::Internal(format!("HTTP client: {e}")))?;

    debug!("POST {} ({} images, model {})", url, images.len(), config.model);

    let response = client
        .post(&url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| FichaError::ExtractionFailed {
            reason: e.to_string(),
        })?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| FichaError::ExtractionFailed {
            reason: format!("reading response body: {e}"),
        })?;

    if !status.is_success() {
        warn!("Provider returned HTTP {} after {:?}", status, start.elapsed());
        return Err(match status.as_u16() {
            401 | 403 => FichaError::AuthRejected {
                status: status.as_u16(),
                detail: extract_api_error(&text),
            },
            429 => FichaError::QuotaExceeded,
            code => FichaError::ApiError {
                status: code,
                body: extract_api_error(&text),
            },
        });
    }

    let reply = parse_reply_content(&text)?;
    debug!(
        "Extraction reply: {} chars in {:?}",
        reply.len(),
        start.elapsed()
    );
    Ok(reply)
}

/// Pull `choices[0].message.content` out of the completion envelope.
fn parse_reply_content(body: &str) -> Result<String, FichaError> {
    let envelope: Value = serde_json::from_str(body).map_err(|e| FichaError::MalformedReply {
        detail: format!("response envelope is not JSON: {e}"),
    })?;

    let content = envelope
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| FichaError::MalformedReply {
            detail: "response has no choices[0].message.content".into(),
        })?;

    if content.trim().is_empty() {
        return Err(FichaError::MalformedReply {
            detail: "model returned an empty reply".into(),
        });
    }

    Ok(content.to_string())
}

/// Best-effort extraction of `error.message` from a provider error body,
/// falling back to the raw body so nothing is swallowed.
fn extract_api_error(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::encode::encode_image;

    #[test]
    fn request_body_shape() {
        let config = ExtractionConfig::default();
        let images = vec![encode_image(&[0xFF, 0xD8, 0xFF, 0xE0])];
        let body = build_request_body(&config, &images);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["response_format"]["type"], "json_object");

        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image_url");
        assert!(content[1]["image_url"]["url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn one_image_block_per_photo() {
        let config = ExtractionConfig::default();
        let images: Vec<_> = (0..3).map(|_| encode_image(&[0xFF, 0xD8])).collect();
        let body = build_request_body(&config, &images);
        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 4); // 1 text + 3 images
    }

    #[test]
    fn reply_content_extracted() {
        let body = r#"{"choices": [{"message": {"content": "{\"marca\": \"X\"}"}}]}"#;
        assert_eq!(parse_reply_content(body).unwrap(), r#"{"marca": "X"}"#);
    }

    #[test]
    fn missing_choices_is_malformed() {
        let err = parse_reply_content(r#"{"id": "cmpl-1"}"#);
        assert!(matches!(err, Err(FichaError::MalformedReply { .. })));
    }

    #[test]
    fn empty_content_is_malformed() {
        let body = r#"{"choices": [{"message": {"content": "  "}}]}"#;
        assert!(matches!(
            parse_reply_content(body),
            Err(FichaError::MalformedReply { .. })
        ));
    }

    #[test]
    fn api_error_message_preferred_over_raw_body() {
        let body = r#"{"error": {"message": "invalid api key", "type": "auth"}}"#;
        assert_eq!(extract_api_error(body), "invalid api key");
        assert_eq!(extract_api_error("plain text failure"), "plain text failure");
    }
}
