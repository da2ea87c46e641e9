//! thebrain-mcp: MCP server exposing TheBrain thoughts to AI assistants
//!
//! Speaks line-delimited JSON-RPC on stdin/stdout and logs to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use thebrain_mcp::brain::BrainClient;
use thebrain_mcp::config::{self, Config};
use thebrain_mcp::mcp::router::Router;
use thebrain_mcp::mcp::server::McpServer;

/// MCP server for TheBrain.
///
/// Exposes thought search, retrieval, creation, update and deletion as MCP
/// tools, and thoughts themselves as MCP resources.
#[derive(Parser, Debug)]
#[command(name = "thebrain-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// TheBrain API key (overrides `THEBRAIN_API_KEY`)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,

    /// Brain identifier (overrides `THEBRAIN_BRAIN_ID`)
    #[arg(long, value_name = "ID")]
    brain_id: Option<String>,

    /// API base URL (overrides `THEBRAIN_API_URL`)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Layers CLI values over the loaded configuration.
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(key) = &self.api_key {
            cfg.api.api_key = Some(key.clone());
        }
        if let Some(brain) = &self.brain_id {
            cfg.api.brain_id = Some(brain.clone());
        }
        if let Some(url) = &self.base_url {
            cfg.api.base_url = Some(url.clone());
        }
    }
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber; stdout belongs to the protocol.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the thebrain-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let mut cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    cfg.apply_env();
    args.apply_to(&mut cfg);

    init_tracing(get_log_level(args.verbose, args.quiet, &cfg.logging.level));

    let client = match BrainClient::new(&cfg.api) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nSet THEBRAIN_API_KEY and THEBRAIN_BRAIN_ID, or create");
                    eprintln!("{}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting thebrain-mcp server"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        let mut server = McpServer::stdio(Router::new(client));

        if !server.router().client().health_check().await {
            warn!("TheBrain API health check failed; continuing anyway");
        }

        info!("MCP server ready, waiting for client connection...");
        server.run().await
    });

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn cli_overrides_win() {
        let args = Args::parse_from(["thebrain-mcp", "--api-key", "cli-key", "--brain-id", "b"]);
        let mut cfg = Config::default();
        cfg.api.api_key = Some("file-key".into());

        args.apply_to(&mut cfg);

        assert_eq!(cfg.api.api_key.as_deref(), Some("cli-key"));
        assert_eq!(cfg.api.brain_id.as_deref(), Some("b"));
        assert_eq!(cfg.api.base_url.as_deref(), Some(config::DEFAULT_BASE_URL));
    }

    #[test]
    fn log_level_selection() {
        assert_eq!(get_log_level(0, true, "trace"), Level::ERROR);
        assert_eq!(get_log_level(2, false, "warn"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "INFO"), Level::INFO);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
    }
}
