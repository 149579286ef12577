//! grafdash - Collect static and scripted Grafana dashboards.
//!
//! Usage:
//!   grafdash collect             Resolve dashboards into the output directory
//!   grafdash upload              Upload collected dashboards to Grafana
//!   grafdash extract [ARCHIVE]   Unpack dashboard artifacts
//!   grafdash run                 Extract, collect, then upload
//!   grafdash --help              Show help

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use grafdash_collect::{CollectReport, DashboardCollector, Precedence, Resolution};
use grafdash_core::{DEFAULT_SETTINGS_FILE, Settings};
use grafdash_extract::{ExtractReport, extract_archives};
use grafdash_upload::{
    DashboardPublisher, DashboardUploader, DryRunPublisher, GrafanaClient, UploadReport,
};

#[derive(Parser)]
#[command(
    name = "grafdash",
    version,
    about = "Collect static and scripted Grafana dashboards",
    long_about = "grafdash turns a tree of JSON dashboards and dashboard scripts into a \
                  flat directory of <name>.json files, and uploads them to Grafana.\n\n\
                  Options are read from grafdash.toml in the working directory; flags \
                  override the file."
)]
struct Cli {
    /// Settings file (defaults to ./grafdash.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format of the summary
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Show what would happen without writing files or contacting Grafana
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve all dashboard sources into the output directory
    Collect(CollectArgs),

    /// Upload collected dashboards to Grafana
    Upload {
        /// Directory holding the collected dashboards
        #[arg(long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        grafana: GrafanaArgs,
    },

    /// Extract dashboard archives into the artifact directory
    Extract(ExtractArgs),

    /// Extract configured archives, collect, then upload
    Run {
        #[command(flatten)]
        collect: CollectArgs,

        #[command(flatten)]
        grafana: GrafanaArgs,
    },
}

#[derive(Args)]
struct CollectArgs {
    /// Directory with locally authored dashboards
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Directory with dashboards extracted from artifacts
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Directory receiving <name>.json files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Extra location for script imports (repeatable)
    #[arg(long = "classpath", value_name = "DIR")]
    classpath: Vec<PathBuf>,

    /// Which root wins name collisions (directory, artifact)
    #[arg(long)]
    precedence: Option<Precedence>,

    /// Glob of files to leave out, relative to a root (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Include hidden files and directories
    #[arg(long, overrides_with = "skip_hidden")]
    include_hidden: bool,

    /// Leave out hidden files and directories
    #[arg(long, overrides_with = "include_hidden")]
    skip_hidden: bool,

    /// Remove existing *.json files from the output directory first
    #[arg(long, overrides_with = "no_clean")]
    clean: bool,

    /// Keep existing files in the output directory
    #[arg(long, overrides_with = "clean")]
    no_clean: bool,

    /// Abort on the first per-file failure
    #[arg(long, overrides_with = "no_fail_fast")]
    fail_fast: bool,

    /// Record per-file failures and keep going
    #[arg(long, overrides_with = "fail_fast")]
    no_fail_fast: bool,
}

#[derive(Args)]
struct GrafanaArgs {
    /// Grafana base URL
    #[arg(long, env = "GRAFANA_URL")]
    url: Option<String>,

    /// Grafana service account token
    #[arg(long, env = "GRAFANA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Folder receiving the dashboards
    #[arg(long)]
    folder_uid: Option<String>,

    /// Tag added to every uploaded dashboard (repeatable)
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Version history message
    #[arg(long)]
    message: Option<String>,

    /// Stop at the first failed upload
    #[arg(long, overrides_with = "no_upload_fail_fast")]
    upload_fail_fast: bool,

    /// Keep uploading after a failed upload
    #[arg(long, overrides_with = "upload_fail_fast")]
    no_upload_fail_fast: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Zip or jar archives (defaults to extract.archives)
    archives: Vec<PathBuf>,

    /// Target directory (defaults to extract.into, then collect.artifact_dir)
    #[arg(long)]
    into: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl CollectArgs {
    fn apply(self, settings: &mut Settings) {
        let c = &mut settings.collect;
        if let Some(dir) = self.dir {
            c.dir = Some(dir);
        }
        if let Some(artifact_dir) = self.artifact_dir {
            c.artifact_dir = Some(artifact_dir);
        }
        if let Some(output_dir) = self.output_dir {
            c.output_dir = Some(output_dir);
        }
        if let Some(precedence) = self.precedence {
            c.precedence = Some(precedence);
        }
        c.classpath.extend(self.classpath);
        c.exclude.extend(self.exclude);
        if let Some(include_hidden) = switch(self.include_hidden, self.skip_hidden) {
            c.include_hidden = Some(include_hidden);
        }
        if let Some(clean) = switch(self.clean, self.no_clean) {
            c.clean = Some(clean);
        }
        if let Some(fail_fast) = switch(self.fail_fast, self.no_fail_fast) {
            c.fail_fast = Some(fail_fast);
        }
    }
}

impl GrafanaArgs {
    fn apply(self, settings: &mut Settings) {
        let g = &mut settings.grafana;
        if let Some(url) = self.url {
            g.url = Some(url);
        }
        if let Some(token) = self.token {
            g.token = Some(token);
        }
        if let Some(folder_uid) = self.folder_uid {
            g.folder_uid = Some(folder_uid);
        }
        if let Some(message) = self.message {
            g.message = Some(message);
        }
        for tag in self.tags {
            if !g.tags.contains(&tag) {
                g.tags.push(tag);
            }
        }
        if let Some(fail_fast) = switch(self.upload_fail_fast, self.no_upload_fail_fast) {
            g.fail_fast = Some(fail_fast);
        }
    }
}

/// Value of a `--flag` / `--no-flag` pair; `None` when neither was given.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut settings = load_settings(cli.config.as_deref())?;
    let format = cli.format;
    let dry_run = cli.dry_run;

    let success = match cli.command {
        Command::Collect(args) => {
            args.apply(&mut settings);
            let (success, summary) = run_collect(&settings, dry_run, format)?;
            print_json(format, &summary)?;
            success
        }
        Command::Upload {
            output_dir,
            grafana,
        } => {
            if let Some(output_dir) = output_dir {
                settings.collect.output_dir = Some(output_dir);
            }
            grafana.apply(&mut settings);
            let report = run_upload(&settings, dry_run)?;
            print_upload(&report, format);
            print_json(format, &json!(report))?;
            report.is_success()
        }
        Command::Extract(args) => {
            if !args.archives.is_empty() {
                settings.extract.archives = args.archives;
            }
            if let Some(into) = args.into {
                settings.extract.into = Some(into);
            }
            let report = run_extract(&settings, dry_run)?;
            if let Some(ref report) = report {
                print_extract(report, format);
            }
            print_json(format, &json!(report))?;
            true
        }
        Command::Run { collect, grafana } => {
            collect.apply(&mut settings);
            grafana.apply(&mut settings);
            run_all(&settings, dry_run, format)?
        }
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over the flags.
fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let (path, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_SETTINGS_FILE), false),
    };
    Settings::load(&path, required)
        .with_context(|| format!("Failed to load settings from {}", path.display()))
}

/// Collect dashboards, or only resolve them on a dry run.
fn run_collect(
    settings: &Settings,
    dry_run: bool,
    format: OutputFormat,
) -> Result<(bool, serde_json::Value)> {
    let config = settings.collect_config()?;
    let collector =
        DashboardCollector::with_default_creators(config).context("Invalid collect options")?;

    if dry_run {
        let resolution = collector.resolve().context("Collection failed")?;
        print_resolution(&resolution, format);
        let success = resolution.failures.is_empty();
        return Ok((success, resolution_json(&resolution)));
    }

    let report = collector.collect().context("Collection failed")?;
    print_collect(&report, format);
    Ok((report.is_success(), json!(report)))
}

fn run_upload(settings: &Settings, dry_run: bool) -> Result<UploadReport> {
    let config = settings.upload_config()?;
    let output_dir = settings.output_dir();

    let publisher: Box<dyn DashboardPublisher> = if dry_run {
        Box::new(DryRunPublisher)
    } else {
        Box::new(GrafanaClient::new(&config).context("Failed to create Grafana client")?)
    };

    let uploader = DashboardUploader::new(config, publisher);
    let report = uploader
        .upload_dir(&output_dir)
        .with_context(|| format!("Failed to upload from {}", output_dir.display()))?;
    Ok(report)
}

/// Extract configured archives. `None` when there is nothing to extract.
fn run_extract(settings: &Settings, dry_run: bool) -> Result<Option<ExtractReport>> {
    let archives = &settings.extract.archives;
    if archives.is_empty() {
        tracing::info!("No archives to extract");
        return Ok(None);
    }

    let into = settings.extract_target()?;
    if dry_run {
        for archive in archives {
            tracing::info!(
                "Dry run: would extract {} into {}",
                archive.display(),
                into.display()
            );
        }
        return Ok(None);
    }

    let report = extract_archives(archives, &into).context("Extraction failed")?;
    Ok(Some(report))
}

/// Extract, collect, then upload. Upload is skipped when collection failed.
fn run_all(settings: &Settings, dry_run: bool, format: OutputFormat) -> Result<bool> {
    // Fail on missing Grafana options before any file is touched.
    settings.upload_config()?;
    settings.check_extract_target()?;

    let extract = run_extract(settings, dry_run)?;
    if let Some(ref report) = extract {
        print_extract(report, format);
    }

    let (collected, collect) = run_collect(settings, dry_run, format)?;

    let upload = if !collected {
        tracing::warn!("Skipping upload: collection reported failures");
        None
    } else if dry_run {
        tracing::info!("Dry run: skipping upload of unwritten dashboards");
        None
    } else {
        let report = run_upload(settings, false)?;
        print_upload(&report, format);
        Some(report)
    };

    let success = collected && upload.as_ref().is_none_or(UploadReport::is_success);
    print_json(
        format,
        &json!({ "extract": extract, "collect": collect, "upload": upload }),
    )?;
    Ok(success)
}

fn print_json(format: OutputFormat, value: &serde_json::Value) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

fn resolution_json(resolution: &Resolution) -> serde_json::Value {
    let dashboards: Vec<_> = resolution
        .dashboards
        .values()
        .map(|d| json!({ "name": d.name, "source": d.source, "size": d.size() }))
        .collect();
    json!({
        "dashboards": dashboards,
        "skipped": resolution.skipped,
        "overrides": resolution.overrides,
        "failures": resolution.failures,
    })
}

fn print_collect(report: &CollectReport, format: OutputFormat) {
    if format != OutputFormat::Text {
        return;
    }

    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} dashboard(s) - {}",
        report.written(),
        format_size(report.total_size())
    );
    println!(" Output: {}", report.output_dir.display());
    println!("{}", "─".repeat(60));

    for dashboard in &report.dashboards {
        println!(
            "   {:<36} {:>8} {:>10}",
            truncate(&dashboard.name, 36),
            dashboard.source.kind,
            format_size(dashboard.size)
        );
    }

    if !report.overrides.is_empty() {
        println!();
        println!(" {} override(s):", report.overrides.len());
        for o in &report.overrides {
            println!(
                "   {} <- {} (replaced {})",
                o.name,
                o.kept.path.display(),
                o.replaced.path.display()
            );
        }
    }

    if !report.removed.is_empty() {
        println!();
        println!(" Removed {} stale file(s)", report.removed.len());
    }

    print_failures(report.failures.iter().map(|f| (f.path.as_path(), &f.message)));
    println!();
}

fn print_resolution(resolution: &Resolution, format: OutputFormat) {
    if format != OutputFormat::Text {
        return;
    }

    println!();
    println!("{}", "─".repeat(60));
    println!(" Dry run: {} dashboard(s) resolved", resolution.dashboards.len());
    println!("{}", "─".repeat(60));
    for dashboard in resolution.dashboards.values() {
        println!(
            "   {:<36} {}",
            truncate(&dashboard.name, 36),
            dashboard.source.path.display()
        );
    }
    print_failures(
        resolution
            .failures
            .iter()
            .map(|f| (f.path.as_path(), &f.message)),
    );
    println!();
}

fn print_upload(report: &UploadReport, format: OutputFormat) {
    if format != OutputFormat::Text {
        return;
    }

    println!();
    println!("{}", "─".repeat(60));
    println!(
        " Uploaded {} dashboard(s), {} failed",
        report.uploaded.len(),
        report.failures.len()
    );
    println!("{}", "─".repeat(60));
    for dashboard in &report.uploaded {
        println!(
            "   {:<36} {}",
            truncate(&dashboard.name, 36),
            dashboard.url.as_deref().unwrap_or("-")
        );
    }
    print_failures(report.failures.iter().map(|f| (f.path.as_path(), &f.message)));
    println!();
}

fn print_extract(report: &ExtractReport, format: OutputFormat) {
    if format != OutputFormat::Text {
        return;
    }

    println!();
    println!(
        " Extracted {} file(s) from {} archive(s) into {}",
        report.extracted(),
        report.archives.len(),
        report.target.display()
    );
    for duplicate in &report.duplicates {
        println!(
            "   duplicate {}: {} overwrote {}",
            duplicate.path.display(),
            duplicate.kept.display(),
            duplicate.replaced.display()
        );
    }
}

fn print_failures<'a>(failures: impl Iterator<Item = (&'a Path, &'a String)>) {
    let failures: Vec<_> = failures.collect();
    if failures.is_empty() {
        return;
    }
    println!();
    println!(" {} failure(s):", failures.len());
    for (path, message) in failures {
        println!("   {}: {}", path.display(), message);
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 1).collect();
        format!("{kept}…")
    }
}
