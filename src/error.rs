//! Error types for the foto2ficha library.
//!
//! A single flat [`FichaError`] covers the whole capture workflow. The
//! variants group into three families that callers treat differently:
//!
//! * **Precondition errors** (`MissingCredential`, `MissingImages`) — the
//!   extraction was never attempted; nothing was sent over the network.
//! * **Extraction errors** (`ExtractionFailed`, `AuthRejected`,
//!   `QuotaExceeded`, `ApiError`, `MalformedReply`) — the remote call was
//!   issued and failed, or its reply could not be parsed. The session's held
//!   record is left untouched; there is no retry.
//! * **Export errors** (`TableSerialization`, `OutputWriteFailed`) — fatal to
//!   the export action only, never to the session.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the foto2ficha library.
#[derive(Debug, Error)]
pub enum FichaError {
    // ── Precondition errors ───────────────────────────────────────────────
    /// No API credential was provided.
    #[error("No API credential provided.\nSet OPENAI_API_KEY or pass a key explicitly.")]
    MissingCredential,

    /// The image list was empty.
    #[error("No images to analyse.\nSupply at least one JPEG or PNG photo of the packaging.")]
    MissingImages,

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The HTTP request itself failed (DNS, TLS, timeout, connection reset).
    #[error("Extraction request failed: {reason}\nCheck your internet connection and the endpoint URL.")]
    ExtractionFailed { reason: String },

    /// The provider rejected the credential (HTTP 401/403).
    #[error("Authentication rejected by the provider (HTTP {status}): {detail}")]
    AuthRejected { status: u16, detail: String },

    /// The provider returned HTTP 429.
    #[error("Quota or rate limit exceeded (HTTP 429). Wait and trigger the extraction again.")]
    QuotaExceeded,

    /// Any other non-success HTTP status from the provider.
    #[error("Provider API error (HTTP {status}): {body}")]
    ApiError { status: u16, body: String },

    /// The model reply was missing, empty, or not the expected JSON object.
    #[error("Model reply was not a valid product record: {detail}")]
    MalformedReply { detail: String },

    // ── Export errors ─────────────────────────────────────────────────────
    /// The edited nutrition table could not be serialised.
    #[error("Failed to serialise the nutrition table: {0}")]
    TableSerialization(String),

    /// Could not write the export artifact to disk.
    #[error("Failed to write export file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FichaError {
    /// True when the extraction was refused before any network I/O.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::MissingCredential | Self::MissingImages)
    }
}
