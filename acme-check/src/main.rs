//! ACME Check CLI Application
//!
//! Runs the offline preflight pipeline against one domain and reports whether
//! it can be validated with the requested ACME challenge method.

mod output;

use acme_check_lib::{
    load_env_config, preflight_pipeline, Checker, ConfigManager, FileConfig, ScanContext,
    Settings, ValidationMethod,
};
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use std::process;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Exit code when the domain has findings.
const EXIT_FINDINGS: i32 = 1;

/// Exit code when the diagnosis itself failed.
const EXIT_FAILURE: i32 = 2;

type LogHandle = reload::Handle<EnvFilter, Registry>;

/// CLI arguments for acme-check
#[derive(Parser, Debug)]
#[command(name = "acme-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check whether a domain is ready for an ACME challenge method")]
#[command(
    long_about = "Check whether a domain is ready for an ACME challenge method.\n\nRuns the offline preflight checks (method, domain syntax, deprecated methods, wildcard rules).\nExit status: 0 clean, 1 problems found, 2 the check could not be performed."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Domain to check (e.g., example.com or *.example.com)
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// Validation method: http-01, dns-01, tls-sni-01 or tls-sni-02
    #[arg(short = 'm', long = "method", value_name = "METHOD")]
    pub method: Option<String>,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json")]
    pub json: bool,

    /// Show problem details and a summary line
    #[arg(short = 'p', long = "pretty")]
    pub pretty: bool,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Use this configuration file instead of discovering one
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let log_handle = init_logging(args.verbose);

    let file_config = match load_file_config(&args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {}", message);
            process::exit(EXIT_FAILURE);
        }
    };
    let settings = Settings::resolve(&file_config, &load_env_config());

    if let Some(handle) = log_handle {
        if let Err(err) = handle.reload(EnvFilter::new(&settings.log_level)) {
            tracing::warn!(error = %err, "could not apply configured log level");
        }
    }

    let method = args
        .method
        .as_deref()
        .map(|m| ValidationMethod::new(m.trim()))
        .unwrap_or_else(|| settings.method.clone());
    let json = args.json || settings.json;
    let pretty = args.pretty || settings.pretty;

    let pipeline = preflight_pipeline();
    let ctx = ScanContext::new();
    let domain = args.domain.trim();

    tracing::debug!(domain, %method, checks = pipeline.len(), "starting scan");
    let evaluation = pipeline.check(&ctx, domain, &method).await;
    tracing::debug!(elapsed = ?ctx.elapsed(), "scan finished");

    let report = output::Report::new(domain, &method, evaluation);
    let rendered = if json {
        report.to_json()
    } else {
        Ok(report.to_text(pretty))
    };

    match rendered {
        Ok(text) => println!("{}", text),
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(EXIT_FAILURE);
        }
    }

    if let Some(error) = &report.error {
        if !json {
            eprintln!("Error: {}", error);
        }
        process::exit(EXIT_FAILURE);
    }
    if !report.problems.is_empty() {
        process::exit(EXIT_FINDINGS);
    }
}

/// Explicit `--config` must load; discovered files are best effort.
fn load_file_config(args: &Args) -> Result<FileConfig, String> {
    let manager = ConfigManager::new(args.verbose);
    match &args.config {
        Some(path) => manager.load_file(path).map_err(|e| e.to_string()),
        None => Ok(manager.discover_and_load()),
    }
}

/// Installed before configuration is read so its warnings reach stderr.
///
/// `RUST_LOG` wins, then `-v`. Otherwise logging starts at `warn` and the
/// returned handle switches to the configured level once it is known.
fn init_logging(verbose: bool) -> Option<LogHandle> {
    let (filter, fixed) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) if verbose => (EnvFilter::new("debug"), true),
        Err(_) => (EnvFilter::new("warn"), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(console::colors_enabled_stderr()),
        )
        .init();

    (!fixed).then_some(handle)
}
