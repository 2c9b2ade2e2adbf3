//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use ldgraph_core::ValidationReport;
use ldgraph_core::assembler::embed_html;
use ldgraph_core::pipeline::{self, PipelineOutput, ProgressReporter, StageNotice};
use ldgraph_remote::{HttpContentStore, HttpValidator, MemoryContentStore};
use ldgraph_shared::{AppConfig, ContentRecord, init_config, load_config, load_config_from};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ldgraph: generate and validate schema.org JSON-LD for a blog.
#[derive(Parser)]
#[command(
    name = "ldgraph",
    version,
    about = "Turn a blog CSV export into a validated schema.org JSON-LD graph.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.ldgraph/ldgraph.toml.
    #[arg(long, global = true, env = "LDGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Serialization of the generated document.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    /// Bare JSON-LD document.
    Json,
    /// JSON-LD wrapped in a `<script type="application/ld+json">` tag.
    Html,
}

/// Rendering of the validation report.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum ReportFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build the JSON-LD graph from a CSV export and validate it.
    Generate {
        /// CSV export of blog posts.
        input: PathBuf,

        /// Write the document here instead of stdout.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format.
        #[arg(long, default_value = "json")]
        format: OutputFormat,

        /// Report format.
        #[arg(long, default_value = "text")]
        report: ReportFormat,

        /// Do not submit article URLs to the configured external validators.
        #[arg(long)]
        skip_external: bool,

        /// Fetch bodies for rows that have none from the live pages.
        #[arg(long)]
        fetch_missing: bool,
    },

    /// Validate an existing JSON-LD document.
    Validate {
        /// Path to the document.
        document: PathBuf,

        /// Report format.
        #[arg(long, default_value = "text")]
        report: ReportFormat,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "ldgraph=info",
        1 => "ldgraph=debug",
        _ => "ldgraph=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command. Hard validation errors map to exit code 1.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config;
    match cli.command {
        Command::Generate {
            input,
            out,
            format,
            report,
            skip_external,
            fetch_missing,
        } => {
            let config = resolve_config(config_path.as_deref())?;
            let opts = GenerateOptions {
                input,
                out,
                format,
                report,
                skip_external,
                fetch_missing,
            };
            cmd_generate(&config, &opts).await
        }
        Command::Validate { document, report } => {
            let config = resolve_config(config_path.as_deref())?;
            cmd_validate(&config, &document, report)
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Init => cmd_config_init()?,
                ConfigAction::Show => cmd_config_show(config_path.as_deref())?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

struct GenerateOptions {
    input: PathBuf,
    out: Option<PathBuf>,
    format: OutputFormat,
    report: ReportFormat,
    skip_external: bool,
    fetch_missing: bool,
}

async fn cmd_generate(config: &AppConfig, opts: &GenerateOptions) -> Result<ExitCode> {
    info!(input = %opts.input.display(), "generating JSON-LD graph");

    let mut records = ldgraph_ingest::read_records(&opts.input)?;
    let hydration = hydrate(&mut records, config, opts.fetch_missing).await?;

    let mut output = pipeline::run(&records, config)?;
    output.add_notices(hydration);

    if !opts.skip_external && !config.remote.validators.is_empty() {
        let validators = HttpValidator::from_config(&config.remote.validators, config.remote.timeout_secs)?;
        let reporter = CliProgress::new();
        pipeline::run_external_validation(&mut output, &validators, &reporter).await;
    }

    let rendered = match opts.format {
        OutputFormat::Json => format!("{}\n", output.json),
        OutputFormat::Html => embed_html(&output.json),
    };
    match &opts.out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = rendered.len(), "document written");
        }
        None => print!("{rendered}"),
    }

    print_summary(&output);
    print_report(&output.report, opts.report)?;
    Ok(exit_code(&output.report))
}

/// Fill empty bodies from the configured content map, then from the live
/// pages when fetching is enabled. Only the last pass's notices are kept.
async fn hydrate(
    records: &mut [ContentRecord],
    config: &AppConfig,
    fetch_missing: bool,
) -> Result<Vec<StageNotice>> {
    let mut notices = Vec::new();

    if let Some(map_path) = &config.remote.content_map {
        let store = MemoryContentStore::from_json_file(Path::new(map_path)).await?;
        info!(pages = store.len(), "loaded content map");
        let reporter = CliProgress::new();
        notices = pipeline::hydrate_bodies(records, &store, &reporter).await;
    }

    if fetch_missing || config.remote.fetch_live_pages {
        let store = HttpContentStore::new(config.remote.timeout_secs)?;
        let reporter = CliProgress::new();
        notices = pipeline::hydrate_bodies(records, &store, &reporter).await;
    }

    Ok(notices)
}

fn print_summary(output: &PipelineOutput) {
    let stats = &output.stats;
    eprintln!();
    eprintln!("  Records:    {}", stats.records);
    eprintln!("  Articles:   {}", stats.articles);
    eprintln!("  Skipped:    {}", stats.skipped);
    eprintln!("  Duplicates: {}", stats.duplicates);
    eprintln!("  Size:       {} bytes", stats.bytes);
    eprintln!("  SHA-256:    {}", output.digest);
    eprintln!();
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn cmd_validate(config: &AppConfig, document: &Path, format: ReportFormat) -> Result<ExitCode> {
    let json = std::fs::read_to_string(document)
        .wrap_err_with(|| format!("failed to read {}", document.display()))?;
    info!(path = %document.display(), bytes = json.len(), "validating document");

    let report = pipeline::validate_json(&json, config)?;
    print_report(&report, format)?;
    Ok(exit_code(&report))
}

fn print_report(report: &ValidationReport, format: ReportFormat) -> Result<()> {
    eprint!("{}", render_report(report, format)?);
    Ok(())
}

fn render_report(report: &ValidationReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(report.render_text()),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|e| eyre!("failed to serialize report: {e}"))?;
            Ok(format!("{json}\n"))
        }
    }
}

fn exit_code(report: &ValidationReport) -> ExitCode {
    if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item(&self, url: &str, current: usize, total: usize) {
        self.spinner.set_message(format!("[{current}/{total}] {url}"));
    }

    fn finish(&self, message: &str) {
        self.spinner.finish_and_clear();
        eprintln!("  {message}");
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
