//! CLI binary for edgequake-pdf2txt.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints the run's diagnostics.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2txt::pipeline::input::resolve_input;
use edgequake_pdf2txt::{
    inspect, run, run_with_chunks, ChunkConfig, ExtractionConfig, PageSelection, PageSeparator, ProgressCallback,
    TranscriptProgressCallback, WhitespacePolicy,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal diagnostics: a page counter bar, one warning line per page
/// without text, and the completion line.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(SPINNER_TICKS),
        );
        bar.set_prefix("Opening");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl TranscriptProgressCallback for CliProgressCallback {
    fn on_transcript_start(&self, _total_pages: usize, selected_pages: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(SPINNER_TICKS),
        );
        self.bar.set_length(selected_pages as u64);
        self.bar.set_prefix("Extracting");
    }

    fn on_page_extracted(&self, _page_num: usize, _total_pages: usize, _cleaned_len: usize) {
        self.bar.inc(1);
    }

    fn on_page_empty(&self, page_num: usize, _total_pages: usize) {
        // `suspend` still prints when the bar is hidden (stderr not a tty).
        self.bar.suspend(|| {
            eprintln!(
                "{} Warning: Page {} contains no extractable text.",
                yellow("⚠"),
                page_num
            )
        });
        self.bar.inc(1);
    }

    fn on_transcript_complete(
        &self,
        total_pages: usize,
        written_pages: usize,
        output_path: Option<&Path>,
    ) {
        self.bar.finish_and_clear();
        let Some(path) = output_path else {
            return;
        };
        eprintln!(
            "{} Cleaned text from {} pages saved to '{}'.  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            path.display(),
            dim(&format!("({written_pages} with text)")),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic transcription
  pdf2txt report.pdf report.txt

  # Only pages 3 to 15, numbered separators
  pdf2txt --pages 3-15 --separator numbered book.pdf book.txt

  # Also fold CRLF, tabs and non-breaking spaces
  pdf2txt --whitespace extended scan.pdf scan.txt

  # Also write 500-character chunks for a search index
  pdf2txt --chunks report.jsonl --chunk-size 500 report.pdf report.txt

  # Machine-readable run summary
  pdf2txt --json report.pdf report.txt > stats.json

  # Inspect PDF metadata (no output file)
  pdf2txt --inspect-only report.pdf

OUTPUT FORMAT:
  UTF-8 text. Wrapped lines are joined, paragraphs are separated by a blank
  line, and consecutive pages by a `--- PAGE BREAK ---` line. Pages without
  extractable text are left out and reported on stderr. With --chunks, each
  line of the chunk file is a JSON object:
  {"index","total_chunks","page_num","section","text"}.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH             Path to an existing libpdfium; skips download
  PDFIUM_PROVISION_CACHE_DIR  Override the default pdfium cache directory
  RUST_LOG                    Override the log filter
"#;

/// Extract PDF text into a clean, paginated plain-text transcript.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Extract PDF text into a clean, paginated plain-text transcript",
    long_about = "Extract the text of every page of a PDF, join lines the renderer wrapped, \
keep paragraph breaks, and write one UTF-8 transcript with a page-break line between pages.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input PDF file.
    input: PathBuf,

    /// Output text file (overwritten if it exists).
    #[arg(required_unless_present = "inspect_only")]
    output: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2TXT_PAGES", default_value = "all")]
    pages: String,

    /// Page separator: page-break, blank, numbered, or custom text.
    #[arg(long, env = "PDF2TXT_SEPARATOR", default_value = "page-break")]
    separator: String,

    /// Whitespace handling: strict (spaces and newlines only) or extended.
    #[arg(long, env = "PDF2TXT_WHITESPACE", value_enum, default_value = "strict")]
    whitespace: WhitespaceArg,

    /// Also write indexing chunks to this file as JSON Lines.
    #[arg(long, env = "PDF2TXT_CHUNKS", value_name = "PATH")]
    chunks: Option<PathBuf>,

    /// Maximum chunk length in characters (with --chunks).
    #[arg(
        long,
        env = "PDF2TXT_CHUNK_SIZE",
        default_value_t = edgequake_pdf2txt::chunk::DEFAULT_MAX_CHARS
    )]
    chunk_size: usize,

    /// Characters of trailing context repeated when a paragraph is split (with --chunks).
    #[arg(
        long,
        env = "PDF2TXT_CHUNK_OVERLAP",
        default_value_t = edgequake_pdf2txt::chunk::DEFAULT_OVERLAP_CHARS
    )]
    chunk_overlap: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2TXT_PASSWORD")]
    password: Option<String>,

    /// Print the run summary (or metadata with --inspect-only) as JSON on stdout.
    #[arg(long, env = "PDF2TXT_JSON")]
    json: bool,

    /// Print PDF metadata only, no transcription.
    #[arg(long)]
    inspect_only: bool,

    /// Disable the progress bar; diagnostics are logged instead.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum WhitespaceArg {
    Strict,
    Extended,
}

impl From<WhitespaceArg> for WhitespacePolicy {
    fn from(v: WhitespaceArg) -> Self {
        match v {
            WhitespaceArg::Strict => WhitespacePolicy::Strict,
            WhitespaceArg::Extended => WhitespacePolicy::Extended,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // With the progress bar active the callback prints the diagnostics, so
    // library logs drop to errors; without it the same events arrive as
    // WARN/INFO log lines.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = preflight(&cli)?;

    // ── Ensure PDFium engine is available ────────────────────────────────
    // First run downloads ~30 MB into the cache; later runs only stat a file.
    if !pdfium_provision::is_pdfium_cached() && !cli.quiet {
        let dl_bar = ProgressBar::new(0);
        dl_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {bytes}/{total_bytes}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(SPINNER_TICKS),
        );
        dl_bar.set_prefix("PDF engine");
        dl_bar.enable_steady_tick(Duration::from_millis(80));

        let bar = dl_bar.clone();
        pdfium_provision::ensure_pdfium_library(Some(&move |downloaded, total| {
            if let Some(t) = total {
                bar.set_length(t);
            }
            bar.set_position(downloaded);
        }))
        .context("Failed to download PDFium engine")?;

        dl_bar.finish_and_clear();
    }

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&input, cli.password.as_deref()).context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Transcribe ───────────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .context("An output path is required unless --inspect-only is given")?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    let stats = match cli.chunks {
        Some(ref chunks_path) => run_with_chunks(&input, &output_path, chunks_path, &config),
        None => run(&input, &output_path, &config),
    }
    .context("Transcription failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
        );
    }

    Ok(())
}

/// Everything that can be checked without the PDF engine, so a mistyped path
/// or a bad flag fails before the engine download starts.
fn preflight(cli: &Cli) -> Result<PathBuf> {
    let input = resolve_input(&cli.input).context("Invalid input")?;
    if !cli.inspect_only {
        build_config(cli, None)?;
    }
    Ok(input)
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .pages(parse_pages(&cli.pages)?)
        .page_separator(parse_separator(&cli.separator))
        .whitespace(cli.whitespace.clone().into());

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if cli.chunks.is_some() {
        builder = builder.chunking(ChunkConfig {
            max_chars: cli.chunk_size,
            overlap_chars: cli.chunk_overlap,
        });
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    Ok(PageSelection::Single(page))
}

/// Parse `--separator` string into `PageSeparator`.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "page-break" | "pagebreak" => PageSeparator::PageBreak,
        "blank" | "none" => PageSeparator::Blank,
        "numbered" => PageSeparator::Numbered,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
