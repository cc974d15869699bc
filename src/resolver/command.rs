// ABOUTME: Resolver that shells out to an external registry tool per request.
// ABOUTME: Credentials and TLS overrides travel through environment variables.

use std::collections::HashMap;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::runtime::Builder;

use crate::config::ResolverConfig;
use crate::request::ImageInfoRequest;

use super::{ResolveError, Resolver};

pub const ENV_USERNAME: &str = "REGBRIDGE_USERNAME";
pub const ENV_PASSWORD: &str = "REGBRIDGE_PASSWORD";
pub const ENV_TLS_HOSTNAME: &str = "REGBRIDGE_TLS_HOSTNAME";
pub const ENV_TLS_STATE: &str = "REGBRIDGE_TLS_STATE";

/// Errors from running the resolver command.
#[derive(Debug, thiserror::Error)]
pub enum CommandResolverError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },

    /// The command failed and explained why on stderr.
    #[error("{0}")]
    Failed(String),

    #[error("{program} produced non-UTF-8 output")]
    InvalidOutput { program: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CommandResolverError> for ResolveError {
    fn from(err: CommandResolverError) -> Self {
        ResolveError::new(err.to_string())
    }
}

/// Runs `program args... <image-ref>` and treats trimmed stdout as the payload.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandResolver {
    pub fn new(program: impl Into<String>) -> Self {
        let defaults = ResolverConfig::default();
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: defaults.timeout,
        }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: config.timeout,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Environment passed to the command for one request.
    ///
    /// Credentials are only passed when both fields are set.
    pub fn request_env(request: &ImageInfoRequest) -> HashMap<&'static str, String> {
        let mut env = HashMap::new();
        if let Some(creds) = request.credentials().filter(|c| c.is_usable()) {
            env.insert(ENV_USERNAME, creds.username().to_string());
            env.insert(ENV_PASSWORD, creds.password().to_string());
        }
        if let Some(hostname) = request.tls().hostname() {
            env.insert(ENV_TLS_HOSTNAME, hostname.to_string());
        }
        if let Some(state) = request.tls().state() {
            env.insert(ENV_TLS_STATE, state.to_string());
        }
        env
    }

    /// Blocking entry point. Drives the command on a runtime owned by this call,
    /// so it works from any worker thread.
    fn run(&self, request: &ImageInfoRequest) -> Result<String, CommandResolverError> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let output = runtime.block_on(self.output_with_deadline(request))?;

        if output.status.success() {
            let payload =
                String::from_utf8(output.stdout).map_err(|_| CommandResolverError::InvalidOutput {
                    program: self.program.clone(),
                })?;
            return Ok(payload.trim().to_string());
        }

        let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if message.is_empty() {
            Err(CommandResolverError::ExitStatus {
                program: self.program.clone(),
                status: output.status,
            })
        } else {
            Err(CommandResolverError::Failed(message))
        }
    }

    /// Spawn, wait, and collect output under one deadline. The child is killed
    /// when the deadline drops it.
    async fn output_with_deadline(
        &self,
        request: &ImageInfoRequest,
    ) -> Result<Output, CommandResolverError> {
        tracing::info!(
            "Running resolver {} for {}",
            self.program,
            request.image_ref()
        );

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(request.image_ref())
            // never leak values inherited from our own environment
            .env_remove(ENV_USERNAME)
            .env_remove(ENV_PASSWORD)
            .env_remove(ENV_TLS_HOSTNAME)
            .env_remove(ENV_TLS_STATE)
            .envs(Self::request_env(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandResolverError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CommandResolverError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            }),
        }
    }
}

impl Resolver for CommandResolver {
    fn resolve(&self, request: &ImageInfoRequest) -> Result<String, ResolveError> {
        self.run(request).map_err(|e| {
            tracing::warn!("Resolver failed for {}: {}", request.image_ref(), e);
            ResolveError::from(e)
        })
    }
}
