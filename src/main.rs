//! sse-debug-proxy: debugging reverse proxy for streaming HTTP APIs
//!
//! Mirrors every request to an upstream, prints colorized request/response
//! dumps, and retries without streaming when a streamed answer comes back
//! empty.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use sse_debug_proxy::{
    config::{AppConfig, Overrides},
    run_server,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
#[command(name = "sse-debug-proxy")]
#[command(version = "0.1.0")]
#[command(about = "Debugging reverse proxy for streaming HTTP APIs")]
#[command(long_about = "
sse-debug-proxy sits between a client and a streaming (SSE) HTTP API and:
  - prints every upstream request and response, decoded and colorized
  - retries with stream=false when a streamed response carries no content

Settings resolve as: defaults < config file < environment < flags.
Environment: TARGET, PORT, LOG_REQUESTS, LOG_RESPONSES

Example usage:
  sse-debug-proxy --target https://api.openai.com --port 1338
  TARGET=http://localhost:8080 sse-debug-proxy --responses false
")]
struct Cli {
    /// Path to config file (default: ./config.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Upstream target URL (overrides TARGET)
    #[arg(long, global = true)]
    target: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Log upstream requests
    #[arg(long, global = true, value_name = "BOOL", action = ArgAction::Set)]
    requests: Option<bool>,

    /// Log upstream responses
    #[arg(long, global = true, value_name = "BOOL", action = ArgAction::Set)]
    responses: Option<bool>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the proxy server (default)
    Run,

    /// Resolve and validate the configuration, then print it
    CheckConfig,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            target: self.target.clone(),
            port: self.port,
            requests: self.requests,
            responses: self.responses,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter))
        .init();

    let config = resolve_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            config.validate()?;
            run_server(config).await?;
        }
        Commands::CheckConfig => check_config(&config),
    }

    Ok(())
}

/// Defaults, then config file, then environment, then flags
fn resolve_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply(&Overrides::from_env()?);
    config.apply(&cli.overrides());

    if let Some(ref path) = cli.config {
        tracing::info!("Loaded configuration from {:?}", path);
    }
    Ok(config)
}

/// Print the resolved configuration
fn check_config(config: &AppConfig) {
    match config.validate() {
        Ok(()) => println!("✓ Configuration is valid\n"),
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            std::process::exit(1);
        }
    }

    println!("Server:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("\nUpstream:");
    println!("  URL: {}", config.upstream.url);
    println!("  TLS: {}", if config.upstream.is_tls() { "enabled" } else { "disabled" });
    if let Some(ref tls) = config.upstream.tls {
        if tls.accept_invalid_certs {
            println!("  TLS: Accepting invalid certificates");
        }
        if let Some(ref ca) = tls.ca_cert_path {
            println!("  TLS CA: {}", ca);
        }
        if let Some(ref cert) = tls.client_cert_path {
            println!("  TLS Client Cert: {}", cert);
        }
    }
    println!("  Timeout: {}s", config.upstream.timeout_seconds);
    println!("\nLogging:");
    println!("  Requests: {}", config.logging.requests);
    println!("  Responses: {}", config.logging.responses);
}
