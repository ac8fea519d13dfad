use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;

mod catalog;
mod cmd;
mod dispatch;
mod endpoint;
mod gate;
mod transport;
mod utils;

use cmd::{Connection, ExecArgs, GetArgs, ListArgs};
use utils::LogFormat;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// cloudcmd - catalog-driven command line client for cloud service operations
///
/// Command layout:
///   cloudcmd list [--service SERVICE] [--json]
///   cloudcmd get  <OPERATION> [--json]
///   cloudcmd exec <OPERATION> [--param K=V ...] [--param-file F] [--select EXPR]
///                 [--pass-thru] [--single-page] [--force] [--raw] [--json]
///
/// Global flags / env:
///   -v / -vv               Increase verbosity (RUST_LOG overrides)
///   -q / --quiet           Errors only
///   -e / --endpoint        Service endpoint (or CLOUDCMD_ENDPOINT env)
///   -H / --header K=V      Extra request header (repeatable)
///   --timeout-secs N       Per-request timeout (or CLOUDCMD_TIMEOUT_SECS, default 60)
///   --log-format plain|json
///
/// Examples:
///   cloudcmd list --service core
///   cloudcmd get ListInstances
///   cloudcmd exec ListVcns -e https://iaas.eu-frankfurt-1.example.com --param CompartmentId=ocid1.compartment.x --json
///   cloudcmd exec DeleteVcn --param VcnId=ocid1.vcn.y --pass-thru --force
#[derive(Parser, Debug)]
#[command(
    name = "cloudcmd",
    version,
    author,
    about = "cloudcmd - catalog-driven CLI for cloud service operations",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Service endpoint URL (scheme defaults to https)
    #[arg(short = 'e', long = "endpoint", global = true, value_name = "URL")]
    endpoint: Option<String>,

    /// Extra request header(s) (repeatable KEY=VALUE)
    #[arg(short = 'H', long = "header", global = true, value_name = "KEY=VALUE")]
    headers: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout-secs", global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Log output format
    #[arg(long = "log-format", global = true, value_enum, default_value_t = LogFormat::Plain)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List catalog operations
    List(ListArgs),

    /// Show one operation's parameters and behaviour
    Get(GetArgs),

    /// Execute (invoke) an operation
    Exec(ExecArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level, cli.log_format);

    // Effective endpoint (CLI flag > CLOUDCMD_ENDPOINT env)
    let raw_endpoint = cli.endpoint.clone().or_else(|| env_non_empty("CLOUDCMD_ENDPOINT"));
    let endpoint = match raw_endpoint.as_deref().map(endpoint::parse_endpoint) {
        None => None,
        Some(Ok(ep)) => Some(ep),
        Some(Err(e)) => {
            eprintln!("Invalid endpoint '{}': {e}", raw_endpoint.as_deref().unwrap_or_default());
            std::process::exit(2);
        }
    };

    let timeout_secs = match cli.timeout_secs {
        Some(t) => t,
        None => match env_non_empty("CLOUDCMD_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(t) => t,
                Err(_) => {
                    eprintln!("Invalid CLOUDCMD_TIMEOUT_SECS '{raw}': expected whole seconds");
                    std::process::exit(2);
                }
            },
        },
    };
    if timeout_secs == 0 {
        eprintln!("Invalid timeout: must be at least 1 second");
        std::process::exit(2);
    }

    if let Some(ep) = &endpoint {
        tracing::debug!(endpoint = %ep, timeout_secs, "connection settings resolved");
    }
    let conn = Connection {
        endpoint,
        headers: cli.headers,
        timeout: Duration::from_secs(timeout_secs),
    };

    match cli.command {
        Commands::List(args) => cmd::execute_list(args),
        Commands::Get(args) => cmd::execute_get(args),
        Commands::Exec(args) => cmd::execute_exec(args, &conn),
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
