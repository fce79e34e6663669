//! Turning an outcome into terminal output.

use quip_fetch::{Outcome, OutcomePair};
use serde_json::Value;

/// Human-readable rendering: a joke's `value`, a list one item per line,
/// anything else as pretty JSON; failures as `<Kind>: <message>`.
pub fn text(outcome: &Outcome) -> String {
    match outcome {
        Ok(data) => data_text(data),
        Err(err) => {
            let report = err.report();
            format!("{}: {}", report.kind, report.message)
        }
    }
}

/// The `{data, error}` pair as pretty JSON.
pub fn json(outcome: &Outcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&OutcomePair::from(outcome))
}

fn data_text(data: &Value) -> String {
    if let Some(joke) = data.get("value").and_then(Value::as_str) {
        return joke.to_string();
    }
    if let Some(items) = data.as_array() {
        if items.iter().all(Value::is_string) {
            return items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n");
        }
    }
    if let Some(s) = data.as_str() {
        return s.to_string();
    }
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}
