//! Beacon CLI - WCAG 2.2 accessibility audits of live web pages.

mod output;

use anyhow::{Context, Result};
use beacon_browser::ChromiumLauncher;
use beacon_core::{AppConfig, AuditTarget, ConformanceLevel};
use beacon_engine::AxeEngine;
use beacon_report::{render_summary, ReportFormat};
use beacon_scanner::AuditOrchestrator;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Audit web pages for WCAG 2.2 conformance using axe-core in Chromium
#[derive(Parser)]
#[command(name = "beacon")]
#[command(version, about, long_about = None)]
struct Cli {
    /// URL(s) to audit
    #[arg(required = true)]
    urls: Vec<String>,

    /// WCAG conformance level [default: from config, AA]
    #[arg(long, short, value_name = "A|AA|AAA")]
    conformance: Option<ConformanceLevel>,

    /// Output file (single URL) or directory (several URLs)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, short, default_value = "json", value_name = "json|markdown|html|all")]
    format: ReportFormat,

    /// Show the browser window
    #[arg(long)]
    visible: bool,

    /// Page load timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Number of pages audited at once
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Config file [default: ~/.config/beacon/config.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "warn,beacon=debug"
    } else {
        "warn,beacon=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbose).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("Failed to load config")?,
    };
    config.apply_env();

    if let Some(concurrency) = cli.concurrency {
        config.audit.concurrent_audits = concurrency;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let level = cli.conformance.unwrap_or(config.audit.conformance);
    let page_timeout = config
        .audit
        .page_timeout(cli.timeout)
        .context("Invalid --timeout")?;

    let mut launcher = ChromiumLauncher::new(config.browser.clone());
    if cli.visible {
        launcher = launcher.visible(true);
    }
    let engine = AxeEngine::from_config(&config.engine).with_context(|| {
        format!(
            "Failed to read axe-core script {}",
            config
                .engine
                .script_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        )
    })?;

    let cancel = CancellationToken::new();
    let orchestrator = AuditOrchestrator::new(Arc::new(launcher), Arc::new(engine))
        .with_max_concurrent_audits(config.audit.concurrent_audits)
        .with_page_timeout(page_timeout)
        .with_retry(config.audit.retry_attempts, config.audit.retry_delay())
        .with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing with results gathered so far");
            cancel.cancel();
        }
    });

    let targets = AuditTarget::many(&cli.urls, level);
    let batch = orchestrator
        .run_batch(targets)
        .await
        .context("Audit aborted")?;

    print!("{}", render_summary(&batch));

    match &cli.output {
        Some(path) => {
            let written = output::write_reports(&batch, path, cli.format)?;
            for file in &written {
                eprintln!("Report written to {}", file.display());
            }
        }
        None if cli.format != ReportFormat::Json => {
            tracing::warn!("--format {} has no effect without --output", cli.format);
        }
        None => {}
    }

    Ok(())
}
