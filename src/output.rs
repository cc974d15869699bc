// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

use crate::unit::ImageInfoResult;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Payloads only, errors on stderr
    Quiet,
    /// One JSON object per lookup
    Json,
}

/// Handles CLI output based on the configured mode.
#[derive(Debug, Clone)]
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            eprintln!("{message}");
        }
    }

    /// Print the outcome of one lookup.
    pub fn lookup(&self, image: &str, outcome: &ImageInfoResult) {
        match (self.mode, outcome) {
            (OutputMode::Normal, Ok(payload)) => println!("{image}: {payload}"),
            (OutputMode::Quiet, Ok(payload)) => println!("{payload}"),
            (OutputMode::Normal | OutputMode::Quiet, Err(err)) => {
                eprintln!("Error: {image}: {err}")
            }
            (OutputMode::Json, _) => {
                println!("{}", json_line(image, &LookupEvent::new(image, outcome)));
            }
        }
    }

    /// Print the closing line for a batch of lookups.
    pub fn summary(&self, total: usize, failed: usize) {
        if self.mode != OutputMode::Normal {
            return;
        }
        let elapsed = self.elapsed_secs();
        if failed == 0 {
            eprintln!("{total} lookup(s) complete ({elapsed:.1}s)");
        } else {
            eprintln!("{failed} of {total} lookup(s) failed ({elapsed:.1}s)");
        }
    }
}

/// JSON line for one lookup, mirroring the `{success, error, result}` envelope.
#[derive(Debug, Serialize)]
pub struct LookupEvent<'a> {
    pub image: &'a str,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> LookupEvent<'a> {
    pub fn new(image: &'a str, outcome: &'a ImageInfoResult) -> Self {
        match outcome {
            Ok(payload) => Self {
                image,
                success: true,
                result: Some(payload),
                error: None,
            },
            Err(err) => Self {
                image,
                success: false,
                result: None,
                error: Some(err.message()),
            },
        }
    }
}

/// Encode one JSON line, falling back to a failure event if `event` can't be encoded.
fn json_line<T: Serialize>(image: &str, event: &T) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::warn!("Failed to encode result for {image}: {e}");
        serde_json::json!({
            "image": image,
            "success": false,
            "error": format!("failed to encode result: {e}"),
        })
        .to_string()
    })
}
