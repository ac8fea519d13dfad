/*!
`get.rs`

Implements the `get` subcommand: show one operation's descriptor.

  cloudcmd get <OPERATION> [--json]

Human output: header box, a facts line (service / impact / paging / default
output field) and a parameter table with columns NAME, TYPE, REQ, FIELD,
DESCRIPTION.
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::catalog::{self, OperationDescriptor};
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};
use crate::cmd::shared::output_error;
use crate::dispatch::BindError;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Operation name (case-insensitive)
    #[arg(value_name = "OPERATION")]
    pub operation: String,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute_get(args: GetArgs) -> Result<()> {
    let Some(op) = catalog::lookup(&args.operation) else {
        return output_error(
            args.json,
            "Get Error",
            &BindError::UnknownOperation(args.operation.trim().to_string()).to_string(),
        );
    };

    if args.json {
        let mut out = describe(op);
        if let Value::Object(ref mut map) = out {
            map.insert("status".into(), json!("ok"));
        }
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_else(|_| out.to_string()));
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!(
        "{}",
        box_header(
            format!("{} {}", emoji("op", &style), op.name),
            Some(op.summary),
            &style
        )
    );

    let paging = match op.paging {
        Some(p) => format!("{} -> {}", p.token_field, p.token_param),
        None => "none".into(),
    };
    println!(
        "{} service={}  impact={}  paging={}  default output={}{}",
        emoji("info", &style),
        op.service,
        op.impact,
        paging,
        op.default_field,
        if op.impact.requires_confirmation() {
            color(Role::Warning, "  (confirmation required)", &style)
        } else {
            String::new()
        }
    );
    println!();

    if op.params.is_empty() {
        println!("{}", color(Role::Dim, "(no parameters)", &style));
        return Ok(());
    }
    let rows: Vec<Vec<String>> = op
        .params
        .iter()
        .map(|p| {
            vec![
                p.name.to_string(),
                p.ty.label(),
                if p.required { "yes".into() } else { "-".into() },
                p.field.to_string(),
                p.description.to_string(),
            ]
        })
        .collect();
    println!("{}", table(&["NAME", "TYPE", "REQ", "FIELD", "DESCRIPTION"], &rows, &style));
    println!(
        "\n{} {}",
        emoji("info", &style),
        color(
            Role::Dim,
            format!("Response fields: {}", op.response_fields.join(", ")),
            &style
        )
    );
    Ok(())
}

/// JSON description of an operation.
fn describe(op: &OperationDescriptor) -> Value {
    let params: Vec<Value> = op
        .params
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "type": p.ty.label(),
                "required": p.required,
                "field": p.field,
                "description": p.description,
            })
        })
        .collect();
    json!({
        "service": op.service,
        "name": op.name,
        "summary": op.summary,
        "impact": op.impact,
        "confirmation_required": op.impact.requires_confirmation(),
        "paging": op.paging.map(|p| json!({"token_param": p.token_param, "token_field": p.token_field})),
        "default_field": op.default_field,
        "response_fields": op.response_fields,
        "parameters": params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        cmd: TestSub,
    }

    #[derive(clap::Subcommand, Debug)]
    enum TestSub {
        Get(GetArgs),
    }

    #[test]
    fn clap_parses_get() {
        let cli = TestCli::try_parse_from(["t", "get", "listvcns"]).unwrap();
        let TestSub::Get(a) = cli.cmd;
        assert_eq!(a.operation, "listvcns");
        assert!(!a.json);
    }

    #[test]
    fn describe_paged_operation() {
        let v = describe(catalog::lookup("ListVcns").unwrap());
        assert_eq!(v["impact"], "none");
        assert_eq!(v["paging"]["token_field"], "opcNextPage");
        assert_eq!(v["default_field"], "items");
        let params = v["parameters"].as_array().unwrap();
        assert!(params.iter().any(|p| p["name"] == "CompartmentId" && p["required"] == true));
    }

    #[test]
    fn describe_gated_operation() {
        let v = describe(catalog::lookup("DeleteObjects").unwrap());
        assert_eq!(v["impact"], "high");
        assert_eq!(v["confirmation_required"], true);
        assert!(v["paging"].is_null());
    }

    #[test]
    fn unknown_operation_is_an_error() {
        let err = execute_get(GetArgs {
            operation: "NoSuchOp".into(),
            json: true,
        })
        .unwrap_err();
        assert!(err.to_string().contains("unknown operation"));
    }
}
