//! Pipeline stages for photo-to-record extraction.
//!
//! Each submodule implements exactly one transformation step, keeping every
//! stage independently testable.
//!
//! ## Data Flow
//!
//! ```text
//! photos ──▶ encode ──▶ llm ──▶ record
//! (bytes)    (base64)   (VLM)   (parsed JSON)
//! ```
//!
//! 1. [`encode`] — base64-wrap each image buffer for the multimodal request
//!    body, sniffing the real media type from the magic bytes
//! 2. [`llm`]    — issue the single chat-completion call; the only stage with
//!    network I/O

pub mod encode;
pub mod llm;
