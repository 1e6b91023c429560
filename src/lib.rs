//! # foto2ficha
//!
//! Extract product spec sheets ("fichas técnicas") from packaging photos
//! using Vision Language Models.
//!
//! ## Why this crate?
//!
//! Registering a packaged food product by hand means retyping the label: the
//! name, brand, weight, manufacturer, the whole nutrition table, the
//! ingredient list. A field operator with a phone camera can instead
//! photograph the package (front, back, nutrition panel) and let a vision
//! model reverse-engineer the label into a structured record, then fix up the
//! fields that came back wrong and export a one-row CSV.
//!
//! ## Workflow Overview
//!
//! ```text
//! photos
//!  │
//!  ├─ 1. Encode   JPEG/PNG bytes → base64 data-URIs
//!  ├─ 2. Extract  one chat-completion call, strict JSON reply
//!  ├─ 3. Edit     form fields + nutrition table, free-form, in memory
//!  └─ 4. Export   timestamped one-row CSV, suggested file name
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use foto2ficha::{ExtractionConfig, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential auto-detected from OPENAI_API_KEY
//!     let config = ExtractionConfig::default();
//!     let photos = vec![std::fs::read("front.jpg")?, std::fs::read("back.jpg")?];
//!
//!     let mut session = Session::new();
//!     session.run_extraction(&photos, &config).await?;
//!
//!     // Fix up whatever the model misread, then export.
//!     if let Some(form) = session.form_mut() {
//!         form.weight = "500g".into();
//!     }
//!     let artifact = session.export()?;
//!     std::fs::write(&artifact.file_name, &artifact.bytes)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `foto2ficha` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! foto2ficha = { version = "0.3", default-features = false }
//! ```
//!
//! ## Session model
//!
//! One [`Session`] holds at most one current record. Each successful
//! extraction replaces the record wholesale; a failed one leaves it
//! untouched. Nothing is persisted — the export artifact is the only thing
//! that leaves the process, and the credential never touches disk.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod form;
pub mod pipeline;
pub mod prompts;
pub mod record;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use error::FichaError;
pub use export::{export_record, export_record_at, write_artifact, EditedRecord, ExportArtifact};
pub use extract::{extract, extract_sync};
pub use form::{Column, FormState, NutritionTable};
pub use record::{ExtractedRecord, NutrientRow};
pub use session::{Session, WorkflowState};
