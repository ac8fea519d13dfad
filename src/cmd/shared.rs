/*!
shared.rs - helpers used by several subcommands.

Focus:
  - collect_params: --param KEY=VALUE pairs -> raw parameter map
  - load_param_file_into_map: JSON / YAML param files (CLI wins on conflict)
  - output_error: JSON or boxed error output, then bail
*/

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;

use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::dispatch::RawValue;
use crate::endpoint::Endpoint;

/// Connection settings resolved from global flags / environment in `main`.
#[derive(Debug, Clone)]
pub struct Connection {
    pub endpoint: Option<Endpoint>,
    pub headers: Vec<String>,
    pub timeout: Duration,
}

/* ---- Parameter Collection ---- */

/// Parse repeated `--param KEY=VALUE` values. `KEY=$null` binds null.
/// A key given twice (ignoring ASCII case) is an error.
pub fn collect_params(pairs: &[String]) -> Result<HashMap<String, RawValue>> {
    let mut provided: HashMap<String, RawValue> = HashMap::new();
    for kv in pairs {
        let Some((k, v)) = kv.split_once('=') else {
            anyhow::bail!("invalid --param (expected KEY=VALUE): {kv}");
        };
        let key = k.trim();
        if key.is_empty() {
            anyhow::bail!("invalid --param (empty key): {kv}");
        }
        if let Some(existing) = provided.keys().find(|k| k.eq_ignore_ascii_case(key)) {
            anyhow::bail!("parameter '{existing}' supplied more than once");
        }
        let value = if v.trim() == crate::dispatch::NULL_LITERAL {
            RawValue::Null
        } else {
            RawValue::Text(v.to_string())
        };
        provided.insert(key.to_string(), value);
    }
    Ok(provided)
}

/// Merge a JSON or YAML object file into `provided`. Keys already present
/// (from `--param`) are kept; matching ignores ASCII case.
pub fn load_param_file_into_map(path: &str, provided: &mut HashMap<String, RawValue>) -> Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read param file: {path}"))?;
    let lower = path.to_ascii_lowercase();

    let value: serde_json::Value = if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value = serde_yaml::from_str(&raw).context("failed to parse YAML param file")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")?
    } else {
        serde_json::from_str(&raw).context("failed to parse JSON param file")?
    };

    let obj = value
        .as_object()
        .ok_or_else(|| anyhow::anyhow!("param file root must be an object"))?;

    for (k, v) in obj {
        if provided.keys().any(|existing| existing.eq_ignore_ascii_case(k)) {
            continue; // CLI overrides file
        }
        let entry = if v.is_null() { RawValue::Null } else { RawValue::Json(v.clone()) };
        provided.insert(k.clone(), entry);
    }
    Ok(())
}

/* ---- Output Helpers ---- */

/// Print an error (JSON object or red box) and return it as `Err`.
pub fn output_error(json: bool, title: &str, msg: &str) -> Result<()> {
    if json {
        let err = serde_json::json!({"status":"error","error":msg});
        println!("{}", serde_json::to_string_pretty(&err).unwrap_or_else(|_| err.to_string()));
    } else {
        let style = StyleOptions::detect();
        let title = format!("{} {title}", emoji("error", &style));
        let boxed = box_header(title, Some(color(Role::Error, msg, &style)), &style);
        eprintln!("{boxed}");
    }
    anyhow::bail!(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn collect_params_basic() {
        let p = collect_params(&["InstanceId=ocid1.x".into(), "Tags=a=b".into(), "DisplayName=$null".into()])
            .unwrap();
        assert_eq!(p.get("InstanceId"), Some(&RawValue::Text("ocid1.x".into())));
        assert_eq!(p.get("Tags"), Some(&RawValue::Text("a=b".into())), "split on first '=' only");
        assert_eq!(p.get("DisplayName"), Some(&RawValue::Null));
    }

    #[test]
    fn collect_params_rejects_malformed() {
        assert!(collect_params(&["novalue".into()]).is_err());
        let err = collect_params(&["=x".into()]).unwrap_err();
        assert!(err.to_string().contains("empty key"));
    }

    #[test]
    fn collect_params_rejects_repeated_key() {
        let err = collect_params(&["InstanceId=a".into(), "InstanceId=b".into()]).unwrap_err();
        assert!(err.to_string().contains("'InstanceId' supplied more than once"), "{err}");

        let err = collect_params(&["InstanceId=a".into(), "instanceid=$null".into()]).unwrap_err();
        assert!(err.to_string().contains("more than once"), "{err}");
    }

    #[test]
    fn param_file_json_merge() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{ "limit": 5, "displayname": "file", "Page": null }}"#).unwrap();

        let mut provided = collect_params(&["DisplayName=cli".into()]).unwrap();
        load_param_file_into_map(file.path().to_str().unwrap(), &mut provided).unwrap();
        assert_eq!(provided.get("limit"), Some(&RawValue::Json(json!(5))));
        assert_eq!(provided.get("Page"), Some(&RawValue::Null));
        assert_eq!(provided.get("DisplayName"), Some(&RawValue::Text("cli".into())));
        assert!(!provided.contains_key("displayname"));
    }

    #[test]
    fn param_file_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "CidrBlocks:\n  - 10.0.0.0/16\nIsIpv6Enabled: true").unwrap();

        let mut provided = HashMap::new();
        load_param_file_into_map(file.path().to_str().unwrap(), &mut provided).unwrap();
        assert_eq!(provided.get("CidrBlocks"), Some(&RawValue::Json(json!(["10.0.0.0/16"]))));
        assert_eq!(provided.get("IsIpv6Enabled"), Some(&RawValue::Json(json!(true))));
    }

    #[test]
    fn param_file_root_must_be_object() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[1,2]").unwrap();
        let err = load_param_file_into_map(file.path().to_str().unwrap(), &mut HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("must be an object"));
    }
}
