/*!
`list.rs`

Implements the `list` subcommand: enumerate the operation catalog.

  cloudcmd list [--service core] [--json]

JSON Output Shape:
{
  "status": "ok",
  "service": "<filter or null>",
  "count": 3,
  "operations": [
    { "service": "core", "name": "ListVcns", "impact": "none", "paged": true, "summary": "..." }
  ]
}
*/

use anyhow::Result;
use clap::Args;

use crate::catalog::{self, OperationDescriptor};
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::output_error;

/// CLI arguments for `cloudcmd list`
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only list operations of this service (e.g. core, identity)
    #[arg(long, value_name = "SERVICE")]
    pub service: Option<String>,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_list(args: ListArgs) -> Result<()> {
    let service = args.service.as_deref().map(str::trim).filter(|s| !s.is_empty());
    if let Some(s) = service
        && !catalog::services().iter().any(|known| known.eq_ignore_ascii_case(s))
    {
        return output_error(
            args.json,
            "List Error",
            &format!(
                "unknown service '{s}' (known: {})",
                catalog::services().join(", ")
            ),
        );
    }

    let ops = select_operations(service);

    if args.json {
        let items: Vec<serde_json::Value> = ops
            .iter()
            .map(|op| {
                serde_json::json!({
                    "service": op.service,
                    "name": op.name,
                    "impact": op.impact,
                    "paged": op.is_paged(),
                    "summary": op.summary,
                })
            })
            .collect();
        let out = serde_json::json!({
            "status": "ok",
            "service": service,
            "count": items.len(),
            "operations": items,
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string()));
        return Ok(());
    }

    let style = StyleOptions::detect();
    let header = box_header(
        format!("{} Operations ({})", emoji("list", &style), ops.len()),
        service.map(|s| format!("service={s}")),
        &style,
    );
    println!("{header}");

    let rows: Vec<Vec<String>> = ops
        .iter()
        .map(|op| {
            vec![
                op.service.to_string(),
                op.name.to_string(),
                impact_cell(op, &style),
                if op.is_paged() { "yes".into() } else { "-".into() },
                op.summary.to_string(),
            ]
        })
        .collect();
    println!("{}", table(&["SERVICE", "NAME", "IMPACT", "PAGED", "SUMMARY"], &rows, &style));

    println!(
        "\n{} {}",
        emoji("info", &style),
        color(
            Role::Dim,
            "Use `cloudcmd get <operation>` for parameter details",
            &style
        )
    );
    Ok(())
}

fn select_operations(service: Option<&str>) -> Vec<&'static OperationDescriptor> {
    catalog::operations()
        .iter()
        .filter(|op| service.is_none_or(|s| op.service.eq_ignore_ascii_case(s)))
        .collect()
}

fn impact_cell(op: &OperationDescriptor, style: &StyleOptions) -> String {
    let role = match op.impact {
        catalog::Impact::None => Role::Dim,
        catalog::Impact::Low => Role::Success,
        catalog::Impact::Medium => Role::Warning,
        catalog::Impact::High => Role::Error,
    };
    color(role, op.impact.as_str(), style)
}
