// ABOUTME: Resolver command configuration.
// ABOUTME: Program, leading arguments, and per-request deadline.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolverConfig {
    #[serde(default = "default_program", deserialize_with = "deserialize_program")]
    pub program: String,

    /// Arguments placed before the image reference.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            timeout: default_timeout(),
        }
    }
}

fn default_program() -> String {
    "regctl".to_string()
}

fn default_args() -> Vec<String> {
    vec!["image".to_string(), "config".to_string()]
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn deserialize_program<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.trim().is_empty() {
        return Err(serde::de::Error::custom("resolver program cannot be empty"));
    }
    Ok(s)
}
