//! Confirmation gate for mutating operations.
//!
//! Runs after binding and before the request is built. Medium and high
//! impact operations need an explicit "yes" unless `--force` was given.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::dispatch::{Binding, Invocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Proceed,
    Declined,
}

/// Source of a yes/no answer.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Interactive prompt on stdin/stderr. End of input counts as "no".
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        let mut err = io::stderr();
        write!(err, "{prompt} [y/N]: ")?;
        err.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(false);
        }
        Ok(is_affirmative(&line))
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Ask for confirmation when the operation's impact demands it.
pub fn check(inv: &Invocation, force: bool, confirm: &mut impl Confirm) -> Result<GateDecision> {
    let op = inv.operation();
    if !op.impact.requires_confirmation() {
        return Ok(GateDecision::Proceed);
    }
    if force {
        tracing::debug!(operation = op.name, impact = %op.impact, "confirmation skipped (--force)");
        return Ok(GateDecision::Proceed);
    }
    if confirm.confirm(&prompt_for(inv))? {
        Ok(GateDecision::Proceed)
    } else {
        tracing::info!(operation = op.name, "declined at confirmation prompt");
        Ok(GateDecision::Declined)
    }
}

fn prompt_for(inv: &Invocation) -> String {
    let op = inv.operation();
    let target = op
        .primary_param()
        .map(|p| match inv.binding(p.name) {
            Binding::Value(serde_json::Value::String(s)) => s,
            Binding::Value(v) => v.to_string(),
            Binding::ExplicitlyNull | Binding::NotSupplied => "<unset>".into(),
        })
        .unwrap_or_else(|| "<none>".into());
    format!(
        "Perform {} ({} impact) on '{}'?",
        op.name, op.impact, target
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;
    use crate::dispatch::{PagingMode, RawValue, SelectOptions, bind};
    use std::collections::HashMap;

    struct Scripted {
        answer: bool,
        prompts: Vec<String>,
    }

    impl Confirm for Scripted {
        fn confirm(&mut self, prompt: &str) -> Result<bool> {
            self.prompts.push(prompt.to_string());
            Ok(self.answer)
        }
    }

    fn inv(op: &str, pairs: &[(&str, &str)]) -> Invocation {
        let raw: HashMap<String, RawValue> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), RawValue::Text(v.to_string())))
            .collect();
        bind(lookup(op).unwrap(), &raw, &SelectOptions::default(), PagingMode::Auto).unwrap()
    }

    #[test]
    fn read_only_operations_pass_without_prompt() {
        let mut c = Scripted { answer: false, prompts: vec![] };
        let decision = check(&inv("ListVcns", &[("CompartmentId", "c")]), false, &mut c).unwrap();
        assert_eq!(decision, GateDecision::Proceed);
        assert!(c.prompts.is_empty());
    }

    #[test]
    fn high_impact_declined() {
        let mut c = Scripted { answer: false, prompts: vec![] };
        let decision = check(&inv("TerminateInstance", &[("InstanceId", "ocid1.instance.q")]), false, &mut c).unwrap();
        assert_eq!(decision, GateDecision::Declined);
        assert_eq!(c.prompts.len(), 1);
        assert!(c.prompts[0].contains("TerminateInstance"));
        assert!(c.prompts[0].contains("ocid1.instance.q"));
    }

    #[test]
    fn force_skips_prompt() {
        let mut c = Scripted { answer: false, prompts: vec![] };
        let decision = check(&inv("RejectDrgAttachment", &[("DrgAttachmentId", "d")]), true, &mut c).unwrap();
        assert_eq!(decision, GateDecision::Proceed);
        assert!(c.prompts.is_empty());
    }

    #[test]
    fn medium_impact_confirmed() {
        let mut c = Scripted { answer: true, prompts: vec![] };
        let decision = check(&inv("UpdateVcn", &[("VcnId", "v")]), false, &mut c).unwrap();
        assert_eq!(decision, GateDecision::Proceed);
        assert_eq!(c.prompts.len(), 1);
    }

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative(" YES "));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("nope"));
    }
}
