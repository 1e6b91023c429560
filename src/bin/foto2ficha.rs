//! CLI binary for foto2ficha.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, drives one capture session, and writes the CSV.

use anyhow::{bail, Context, Result};
use clap::Parser;
use foto2ficha::{
    write_artifact, Column, ExtractionConfig, NutrientRow, Session,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Photograph front, back, and nutrition panel; export CSV to the current dir
  foto2ficha front.jpg back.jpg panel.jpg

  # Choose the output directory
  foto2ficha front.jpg -d ./records

  # Fix fields the model misread before exporting
  foto2ficha front.jpg --set peso=500g --set marca=Frescatto

  # Edit the nutrition table
  foto2ficha panel.jpg --add-row "Fibras,2g,8%" --drop-row 0

  # Print the raw extracted record as JSON instead of exporting
  foto2ficha front.jpg --json

EDITABLE FIELDS (--set name=value):
  produto  marca  peso  fabricante  ingredientes  conservacao  contatos

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY      API credential (or pass --api-key)
  FOTO2FICHA_MODEL    Override model ID

SETUP:
  1. Set API key:  export OPENAI_API_KEY=sk-...
  2. Capture:      foto2ficha front.jpg back.jpg
"#;

/// Extract a product spec sheet from packaging photos and export it as CSV.
#[derive(Parser, Debug)]
#[command(
    name = "foto2ficha",
    version,
    about = "Extract product spec sheets from packaging photos using Vision LLMs",
    long_about = "Photograph a packaged food product (front, back, nutrition panel), let a \
vision model reverse-engineer the label into a structured record, adjust any field, and \
export a one-row CSV. Works with OpenAI and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Packaging photos (JPEG/PNG), at least one.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Directory for the exported CSV (file name derives from the product name).
    #[arg(short = 'd', long, default_value = ".")]
    out_dir: PathBuf,

    /// API credential.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Vision model ID.
    #[arg(long, env = "FOTO2FICHA_MODEL", default_value = "gpt-4o")]
    model: String,

    /// Chat-completion endpoint base URL (OpenAI-compatible).
    #[arg(long, env = "FOTO2FICHA_API_BASE", default_value = "https://api.openai.com/v1")]
    api_base: String,

    /// Max tokens the model may generate for the record.
    #[arg(long, default_value_t = 1500)]
    max_tokens: usize,

    /// Per-call HTTP timeout in seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Edit a scalar field after extraction: --set peso=500g (repeatable).
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    sets: Vec<String>,

    /// Append a nutrition row after extraction: --add-row "Sódio,120mg,5%" (repeatable).
    #[arg(long = "add-row", value_name = "ITEM,QTD,VD")]
    add_rows: Vec<String>,

    /// Remove a nutrition row by 0-based index (repeatable, applied in order).
    #[arg(long = "drop-row", value_name = "INDEX")]
    drop_rows: Vec<usize>,

    /// Edit one table cell: --set-cell "0,qtd,120mg" (repeatable).
    #[arg(long = "set-cell", value_name = "ROW,COLUMN,VALUE")]
    set_cells: Vec<String>,

    /// Print the extracted record as JSON instead of exporting a CSV.
    #[arg(long)]
    json: bool,

    /// Disable the busy spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    // ── Read photos ──────────────────────────────────────────────────────
    let mut photos = Vec::with_capacity(cli.images.len());
    for path in &cli.images {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read photo {}", path.display()))?;
        photos.push(bytes);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ExtractionConfig::builder()
        .api_base(&cli.api_base)
        .model(&cli.model)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.timeout);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Extract ──────────────────────────────────────────────────────────
    // One blocking remote call; the spinner is the busy indicator while it
    // is in flight.
    let spinner = if !cli.quiet && !cli.no_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Reading label");
        bar.set_message(format!("{} photo(s)…", photos.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    let mut session = Session::new();
    let outcome = session.run_extraction(&photos, &config).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    outcome.map(|_| ()).context("Extraction failed")?;

    // ── Apply edits ──────────────────────────────────────────────────────
    apply_edits(&mut session, &cli)?;

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let record = session.record().expect("record held after extraction");
        println!(
            "{}",
            serde_json::to_string_pretty(record).context("Failed to serialise record")?
        );
        return Ok(());
    }

    let artifact = session.export().context("Export failed")?;
    let path = write_artifact(&artifact, &cli.out_dir).context("Failed to write CSV")?;

    if !cli.quiet {
        let form = session.form().expect("form held after extraction");
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(if form.product.is_empty() {
                "(no product name)"
            } else {
                form.product.as_str()
            }),
            dim(&format!("{} nutrition rows", form.nutrition.len())),
        );
        eprintln!("   → {}", bold(&path.display().to_string()));
    }

    Ok(())
}

/// Apply `--set`, `--add-row`, `--drop-row`, and `--set-cell` edits to the
/// session's form. Free-form: any text is accepted, only the shapes of the
/// flag values themselves are checked.
fn apply_edits(session: &mut Session, cli: &Cli) -> Result<()> {
    let form = session
        .form_mut()
        .expect("form held after successful extraction");

    for spec in &cli.sets {
        let (field, value) = spec
            .split_once('=')
            .with_context(|| format!("--set expects FIELD=VALUE, got '{spec}'"))?;
        let slot = match field.trim().to_lowercase().as_str() {
            "produto" => &mut form.product,
            "marca" => &mut form.brand,
            "peso" => &mut form.weight,
            "fabricante" => &mut form.manufacturer,
            "ingredientes" => &mut form.ingredients,
            "conservacao" => &mut form.storage,
            "contatos" => &mut form.contacts,
            other => bail!(
                "Unknown field '{other}' — expected one of: produto, marca, peso, \
                 fabricante, ingredientes, conservacao, contatos"
            ),
        };
        *slot = value.to_string();
    }

    for spec in &cli.add_rows {
        let mut parts = spec.splitn(3, ',').map(str::trim);
        let item = parts.next().unwrap_or_default();
        let qtd = parts.next().unwrap_or_default();
        let vd = parts.next().unwrap_or_default();
        form.nutrition.push_row(NutrientRow::new(item, qtd, vd));
    }

    for &index in &cli.drop_rows {
        if form.nutrition.remove_row(index).is_none() {
            bail!(
                "--drop-row {index} is out of range (table has {} rows)",
                form.nutrition.len()
            );
        }
    }

    for spec in &cli.set_cells {
        let mut parts = spec.splitn(3, ',').map(str::trim);
        let (Some(row), Some(col), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("--set-cell expects ROW,COLUMN,VALUE, got '{spec}'");
        };
        let row: usize = row
            .parse()
            .with_context(|| format!("Invalid row index '{row}'"))?;
        let column = match col.to_lowercase().as_str() {
            "item" => Column::Item,
            "qtd" => Column::Qtd,
            "vd" => Column::Vd,
            other => bail!("Unknown column '{other}' — expected item, qtd, or vd"),
        };
        if !form.nutrition.set_cell(row, column, value) {
            bail!(
                "--set-cell row {row} is out of range (table has {} rows)",
                form.nutrition.len()
            );
        }
    }

    Ok(())
}
