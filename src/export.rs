//! Record export: form edits → one-row CSV artifact.
//!
//! The export is the only externalisation point of the workflow. It stamps
//! the edited record with the capture time, folds the nutrition table into a
//! single embedded-text field, and renders a UTF-8 CSV with one header row
//! and one data row in a fixed column order:
//!
//! ```text
//! Data,Produto,Marca,Peso,Fabricante,Ingredientes,Tabela_JSON
//! ```
//!
//! Quoting is RFC-4180 style, hand-rolled against the fixed column schema:
//! a field is quoted when it contains a comma, quote, or line break, and
//! embedded quotes are doubled. The `Tabela_JSON` field always needs this —
//! it is a JSON array full of quotes and commas.

use crate::error::FichaError;
use crate::form::FormState;
use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

/// Fixed CSV header, matching the field order of [`EditedRecord::to_csv_row`].
pub const CSV_HEADER: &str = "Data,Produto,Marca,Peso,Fabricante,Ingredientes,Tabela_JSON";

/// Timestamp format stamped on every export: day/month/year hour:minute.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Characters allowed verbatim in the suggested file name; everything else
/// is collapsed to `_`. Keeps the name safe on every mainstream filesystem.
static FILENAME_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z._-]+").expect("valid filename regex"));

/// The flat record written to the CSV data row.
///
/// Created once per explicit export action and immediately externalised;
/// the session never retains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedRecord {
    /// Capture timestamp, already formatted ([`TIMESTAMP_FORMAT`]).
    pub captured_at: String,
    pub product: String,
    pub brand: String,
    pub weight: String,
    pub manufacturer: String,
    pub ingredients: String,
    /// The nutrition table serialised as embedded text (JSON array of rows).
    pub nutrition_table: String,
}

impl EditedRecord {
    /// Render the single CSV data row in the fixed column order.
    pub fn to_csv_row(&self) -> String {
        [
            &self.captured_at,
            &self.product,
            &self.brand,
            &self.weight,
            &self.manufacturer,
            &self.ingredients,
            &self.nutrition_table,
        ]
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// A finished export: the flat record, the CSV bytes, and a suggested
/// download file name.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub record: EditedRecord,
    /// UTF-8 CSV: header row + one data row, each newline-terminated.
    pub bytes: Vec<u8>,
    /// `produto_{name}.csv` with the product name sanitised for filesystems.
    pub file_name: String,
}

/// Quote a CSV field when needed (comma, quote, CR or LF), doubling any
/// embedded quotes.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Sanitise the product name for use in a file name.
///
/// Unlike the capture fields themselves (free text, anything goes), the file
/// name leaves the process and lands on a filesystem, so path separators and
/// shell-hostile characters are collapsed. An all-unsafe name degrades to
/// `produto_registro.csv` rather than `produto_.csv`.
pub fn suggested_file_name(product: &str) -> String {
    let safe = FILENAME_UNSAFE.replace_all(product.trim(), "_");
    let safe = safe.trim_matches('_');
    if safe.is_empty() {
        "produto_registro.csv".to_string()
    } else {
        format!("produto_{safe}.csv")
    }
}

/// Export the current form edits, stamped with the local time now.
pub fn export_record(form: &FormState) -> Result<ExportArtifact, FichaError> {
    export_record_at(form, Local::now())
}

/// Export with an explicit timestamp. Split out so tests can pin the clock.
pub fn export_record_at(
    form: &FormState,
    captured_at: DateTime<Local>,
) -> Result<ExportArtifact, FichaError> {
    let record = EditedRecord {
        captured_at: captured_at.format(TIMESTAMP_FORMAT).to_string(),
        product: form.product.clone(),
        brand: form.brand.clone(),
        weight: form.weight.clone(),
        manufacturer: form.manufacturer.clone(),
        ingredients: form.ingredients.clone(),
        nutrition_table: form.nutrition.to_embedded_text()?,
    };

    let csv = format!("{CSV_HEADER}\n{}\n", record.to_csv_row());
    let file_name = suggested_file_name(&record.product);
    info!("Exported record '{}' → {}", record.product, file_name);

    Ok(ExportArtifact {
        record,
        bytes: csv.into_bytes(),
        file_name,
    })
}

/// Write an artifact into `dir` under its suggested file name.
///
/// Uses atomic write (temp file + rename) to prevent partial files. Returns
/// the final path.
pub fn write_artifact(artifact: &ExportArtifact, dir: impl AsRef<Path>) -> Result<PathBuf, FichaError> {
    let path = dir.as_ref().join(&artifact.file_name);
    let tmp_path = path.with_extension("csv.tmp");

    std::fs::write(&tmp_path, &artifact.bytes).map_err(|e| FichaError::OutputWriteFailed {
        path: path.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, &path).map_err(|e| FichaError::OutputWriteFailed {
        path: path.clone(),
        source: e,
    })?;

    Ok(path)
}
