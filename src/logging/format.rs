//! JSON log lines: one JSON object per line (ndjson) for ingestion and audit.

use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// One served prediction, emitted as a standalone ndjson audit line.
#[derive(Serialize)]
pub struct AuditLine<'a> {
    pub ts: String,
    pub probability: f64,
    pub risk_level: &'a str,
    pub prediction: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<&'a str>,
}

/// Initialize tracing with JSON format (one JSON object per line)
pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber: JSON lines to stdout, level from RUST_LOG or default.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stdout);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
                .init();
        }
    }

    /// Emit a single structured log line (e.g. an audit record) without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) {
        if let Ok(line) = serde_json::to_string(event) {
            let _ = writeln!(w, "{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_line_serializes_flat() {
        let line = AuditLine {
            ts: "2026-01-01T00:00:00Z".to_string(),
            probability: 0.42,
            risk_level: "Medium",
            prediction: 0,
            run_id: None,
        };
        let mut buf = Vec::new();
        StructuredLogger::emit_json(&line, &mut buf);
        let rendered = String::from_utf8(buf).unwrap();
        assert!(rendered.contains("\"risk_level\":\"Medium\""));
        assert!(!rendered.contains("run_id"));
    }
}
