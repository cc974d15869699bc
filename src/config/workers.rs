// ABOUTME: Worker pool configuration.
// ABOUTME: Sizing and naming for the threads that run resolver calls.

use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Upper bound on concurrently running resolver calls.
    #[serde(default = "default_max_blocking_threads")]
    pub max_blocking_threads: NonZeroUsize,

    #[serde(default = "default_thread_name")]
    pub thread_name: String,

    /// How long an idle worker thread lingers before exiting.
    #[serde(default = "default_keep_alive", with = "humantime_serde")]
    pub keep_alive: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_blocking_threads: default_max_blocking_threads(),
            thread_name: default_thread_name(),
            keep_alive: default_keep_alive(),
        }
    }
}

fn default_max_blocking_threads() -> NonZeroUsize {
    NonZeroUsize::new(512).unwrap_or(NonZeroUsize::MIN)
}

fn default_thread_name() -> String {
    "regbridge-worker".to_string()
}

fn default_keep_alive() -> Duration {
    Duration::from_secs(10)
}
