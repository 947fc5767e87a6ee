//! Binary entrypoint: read JSON lines from stdin, write JSON lines to stdout.
//!
//! Each input line is an EvaluationRequest. Every line produces one output line:
//! - An Evaluation (alert state + verdict)
//! - An ErrorOutput (when the line or its setup is invalid)
//!
//! Logs go to stderr; set RUST_LOG=debug to trace individual gates.

use alert_engine::request;
use alert_engine::types::{ErrorOutput, EvaluationRequest};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(io::stderr)
    .init();

  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());

  for line in stdin.lock().lines() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        let _ = writeln!(io::stderr(), "alert-engine: read error: {}", e);
        std::process::exit(1);
      }
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    let req: EvaluationRequest = match serde_json::from_str(trimmed) {
      Ok(v) => v,
      Err(e) => {
        let err = ErrorOutput::new(format!("json parse: {}", e)).with_code("invalid_request");
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
        continue;
      }
    };

    match request::process(req) {
      Ok(evaluation) => {
        let _ = serde_json::to_writer(&mut out, &evaluation);
        let _ = writeln!(out);
      }
      Err(e) => {
        let err = ErrorOutput::new(e.to_string()).with_code(e.code());
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
      }
    }
  }

  let _ = out.flush();
}
