use anyhow::{Context as AnyhowContext, Result};
use clap::Parser;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use whereami_scope::{analyze, Analysis, ScopeConfig};

/// Environment variable naming a default TOML config file
const CONFIG_ENV: &str = "WHEREAMI_CONFIG";

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "whereami")]
#[command(about = "Show the enclosing scopes of a source line, from indentation alone", long_about = None)]
#[command(version)]
struct Cli {
    /// Source file to analyze
    file: PathBuf,

    /// Line to locate (1-based); 0 prints every line with its outer line and indentation
    line: u32,

    /// Tab stop width used to measure indentation
    #[arg(long)]
    tab_width: Option<u32>,

    /// Leave out ancestors fewer than this many lines above the queried line
    #[arg(long)]
    window: Option<u32>,

    /// TOML config file (overrides WHEREAMI_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show control-flow snippets without truncation
    #[arg(long)]
    full: bool,

    /// Print structured JSON instead of the one-line summary
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long)]
    quiet: bool,
}

fn load_config(cli: &Cli) -> Result<ScopeConfig> {
    let path = cli
        .config
        .clone()
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

    let mut config = match path {
        Some(path) => ScopeConfig::from_path(&path)
            .with_context(|| format!("could not load config '{}'", path.display()))?,
        None => ScopeConfig::default(),
    };

    if let Some(tab_width) = cli.tab_width {
        config.tab_width = tab_width;
    }
    if let Some(window) = cli.window {
        config.proximity_window = window;
    }
    if cli.full {
        config = config.with_full_snippets();
    }

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    Ok(config)
}

fn report_warnings(file: &Path, analysis: &Analysis<'_>) {
    for warning in analysis.warnings() {
        log::warn!("{}:{}: {warning}", file.display(), warning.line());
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let text = fs::read(&cli.file)
        .with_context(|| format!("could not read file '{}'", cli.file.display()))?;
    log::debug!("read {} bytes from {}", text.len(), cli.file.display());

    let analysis = analyze(&text, &config)
        .with_context(|| format!("could not analyze '{}'", cli.file.display()))?;
    report_warnings(&cli.file, &analysis);

    if cli.json {
        let reports = analysis.reports(cli.line)?;
        let mut json = serde_json::to_string_pretty(&reports)?;
        json.push('\n');
        return print_stdout(&json);
    }

    let rendered = analysis.render_query(cli.line)?;
    print_stdout(&rendered)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    run(&cli)
}
