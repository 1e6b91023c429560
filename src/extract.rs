//! Top-level extraction entry points.
//!
//! `extract` wires the pipeline stages together: precondition checks, image
//! encoding, the single remote call, and reply parsing. Exactly one request
//! goes out per invocation — no retry, no caching, no background work. The
//! call blocks (awaits) until the provider answers or errors.

use crate::config::ExtractionConfig;
use crate::error::FichaError;
use crate::pipeline::{encode, llm};
use crate::record::ExtractedRecord;
use std::time::Instant;
use tracing::{debug, info};

/// Extract a product record from packaging photos.
///
/// # Arguments
/// * `images` — raw JPEG/PNG buffers, at least one
/// * `config` — endpoint, model, and credential settings
///
/// # Errors
/// * [`FichaError::MissingCredential`] / [`FichaError::MissingImages`] —
///   preconditions failed; nothing was sent
/// * extraction errors (`ExtractionFailed`, `AuthRejected`, `QuotaExceeded`,
///   `ApiError`, `MalformedReply`) — the remote call failed or its reply was
///   not a parseable record; no partial record is produced
pub async fn extract(
    images: &[Vec<u8>],
    config: &ExtractionConfig,
) -> Result<ExtractedRecord, FichaError> {
    let api_key = config
        .resolve_api_key()
        .ok_or(FichaError::MissingCredential)?;
    if images.is_empty() {
        return Err(FichaError::MissingImages);
    }

    let start = Instant::now();
    info!("Extracting record from {} photo(s)", images.len());

    let encoded = encode::encode_images(images);
    debug!(
        "Encoded {} photo(s), {} bytes base64 total",
        encoded.len(),
        encoded.iter().map(|e| e.data.len()).sum::<usize>()
    );

    let reply = llm::request_extraction(config, &api_key, &encoded).await?;
    let record = ExtractedRecord::from_json_str(&reply)?;

    info!("Extraction succeeded in {:?}", start.elapsed());
    Ok(record)
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    images: &[Vec<u8>],
    config: &ExtractionConfig,
) -> Result<ExtractedRecord, FichaError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| FichaError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(extract(images, config))
}
