/*!
`exec.rs`

Implements the `exec` subcommand: invoke one catalog operation against the
configured endpoint.

Flow:
  lookup -> collect params (--param / --param-file) -> bind -> confirmation
  gate -> dispatch (one envelope per page) -> render

Parameter injection:
    --param KEY=VALUE               (repeatable; KEY=$null binds null)
    --param-file params.(json|yaml) (merged; CLI --param overrides file entries)

Output selection:
    --select '*'        whole response
    --select Field      one response field
    --select '^Param'   echo a bound parameter
    --pass-thru         echo the operation's primary parameter

JSON output (one document per page):
{
  "operation": "ListVcns",
  "endpoint": "https://...",
  "page": 0,
  "request": { ... },
  "status": "ok",
  "result": ...
}

JSON error output:
{
  "operation": "...", "endpoint": "...", "page": 0, "request": { ... },
  "status": "error", "kind": "service", "error": "message"
}
*/

use anyhow::{Context, Result};
use clap::Args;
use futures_util::StreamExt;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::catalog;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::cmd::shared::{Connection, collect_params, load_param_file_into_map, output_error};
use crate::dispatch::{BindError, Dispatcher, Envelope, Invocation, PagingMode, SelectOptions, bind};
use crate::gate::{self, Confirm, GateDecision, StdinConfirm};
use crate::transport::Transport;
use crate::transport::http::HttpTransport;

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Operation name (case-insensitive), e.g. ListInstances
    #[arg(value_name = "OPERATION")]
    pub operation: String,

    /// Provide parameter (KEY=VALUE), repeatable. KEY=$null binds an explicit null
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Load parameters from file (JSON or YAML). CLI --param overrides file entries
    #[arg(long = "param-file", value_name = "PATH")]
    pub param_file: Option<String>,

    /// Output selector: '*', a response field name, or '^Param'
    #[arg(long, value_name = "EXPR")]
    pub select: Option<String>,

    /// Emit the operation's primary parameter instead of the response
    #[arg(long = "pass-thru")]
    pub pass_thru: bool,

    /// Fetch only the page named by --param Page (no automatic follow-up)
    #[arg(long = "single-page")]
    pub single_page: bool,

    /// Skip the confirmation prompt for medium/high impact operations
    #[arg(long)]
    pub force: bool,

    /// Include the full response next to the selected result
    #[arg(long)]
    pub raw: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

/// What happened during one `exec` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub declined: bool,
    pub envelopes: usize,
    pub failures: usize,
}

pub fn execute_exec(args: ExecArgs, conn: &Connection) -> Result<()> {
    let Some(op) = catalog::lookup(&args.operation) else {
        return output_error(
            args.json,
            "Exec Error",
            &BindError::UnknownOperation(args.operation.trim().to_string()).to_string(),
        );
    };

    let mut provided = match collect_params(&args.params) {
        Ok(p) => p,
        Err(e) => return output_error(args.json, "Exec Error", &e.to_string()),
    };
    if let Some(ref pf) = args.param_file
        && let Err(e) = load_param_file_into_map(pf, &mut provided)
    {
        return output_error(args.json, "Exec Error", &format!("{e:#}"));
    }

    let select = SelectOptions {
        select: args.select.clone(),
        pass_thru: args.pass_thru,
    };
    let paging = if args.single_page {
        PagingMode::Manual
    } else {
        PagingMode::Auto
    };
    let inv = match bind(op, &provided, &select, paging) {
        Ok(inv) => inv,
        Err(e) => return output_error(args.json, "Bind Error", &e.to_string()),
    };
    tracing::debug!(
        operation = op.name,
        selector = %inv.selector().selector(),
        paging = ?inv.paging(),
        "bound"
    );
    if !args.json {
        print_warnings(&inv);
    }

    let Some(endpoint) = conn.endpoint.clone() else {
        return output_error(
            args.json,
            "Exec Error",
            "no endpoint specified (use --endpoint or CLOUDCMD_ENDPOINT)",
        );
    };
    let transport = HttpTransport::new(endpoint, &conn.headers, conn.timeout)?;
    let dispatcher = Dispatcher::new(transport);

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling in-flight request");
            on_signal.cancel();
        }
    });

    let style = StyleOptions::detect();
    let started = Instant::now();
    let summary = rt.block_on(run_operation(
        &dispatcher,
        &inv,
        args.force,
        &mut StdinConfirm,
        &cancel,
        |env| render_envelope(env, dispatcher.endpoint(), &args, &style),
    ))?;
    // Ctrl-C listener must not keep the process alive.
    rt.shutdown_background();

    tracing::debug!(
        operation = op.name,
        envelopes = summary.envelopes,
        failures = summary.failures,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "exec finished"
    );

    if summary.declined {
        report_declined(&inv, args.json, &style);
        return Ok(());
    }
    if summary.failures > 0 {
        anyhow::bail!(
            "{} of {} call(s) to {} failed",
            summary.failures,
            summary.envelopes,
            op.name
        );
    }
    Ok(())
}

/// Gate, then stream every envelope of `inv` into `on_envelope` as it arrives.
pub async fn run_operation<T: Transport>(
    dispatcher: &Dispatcher<T>,
    inv: &Invocation,
    force: bool,
    confirm: &mut impl Confirm,
    cancel: &CancellationToken,
    mut on_envelope: impl FnMut(&Envelope),
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    if gate::check(inv, force, confirm)? == GateDecision::Declined {
        summary.declined = true;
        return Ok(summary);
    }

    let mut record = |env: Envelope| {
        summary.envelopes += 1;
        if !env.is_success() {
            summary.failures += 1;
        }
        on_envelope(&env);
    };

    if !inv.operation().is_paged() {
        record(dispatcher.invoke(inv, cancel).await);
    } else {
        let mut pages = std::pin::pin!(dispatcher.pages(inv, cancel));
        while let Some(env) = pages.next().await {
            record(env);
        }
    }
    Ok(summary)
}

/* ---- Rendering ---- */

fn render_envelope(env: &Envelope, endpoint: &str, args: &ExecArgs, style: &StyleOptions) {
    if args.json {
        let v = env.to_json(endpoint, args.raw);
        println!("{}", serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string()));
        return;
    }

    let subtitle = format!("endpoint={endpoint} • page {}", env.page);
    match (env.selected(), env.error()) {
        (Some(selected), _) => {
            let header = box_header(
                format!("{} {}", emoji("success", style), env.operation),
                Some(subtitle),
                style,
            );
            println!("{header}");
            println!("{}", pretty(selected));
            if args.raw
                && let Some(raw) = env.raw()
            {
                println!("{} {}", emoji("info", style), color(Role::Accent, "Raw Response:", style));
                println!("{}", pretty(raw));
            }
        }
        (None, Some(err)) => {
            let header = box_header(
                format!("{} {} failed ({})", emoji("error", style), env.operation, err.kind()),
                Some(subtitle),
                style,
            );
            eprintln!("{header}");
            eprintln!("{}", color(Role::Error, err.to_string(), style));
        }
        (None, None) => {}
    }
}

fn print_warnings(inv: &Invocation) {
    let style = StyleOptions::detect();
    for w in inv.warnings() {
        eprintln!(
            "{} {}",
            emoji("warn", &style),
            color(Role::Warning, w.to_string(), &style)
        );
    }
}

fn report_declined(inv: &Invocation, json: bool, style: &StyleOptions) {
    let op = inv.operation();
    if json {
        let v = serde_json::json!({
            "status": "skipped",
            "operation": op.name,
            "impact": op.impact,
            "reason": "declined at confirmation prompt",
        });
        println!("{}", serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string()));
    } else {
        println!(
            "{} {}",
            emoji("info", style),
            color(Role::Dim, format!("{} skipped (not confirmed)", op.name), style)
        );
    }
}

fn pretty(v: &serde_json::Value) -> String {
    serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
}
