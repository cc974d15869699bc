// ABOUTME: Config scaffolding for new setups.
// ABOUTME: Creates a commented regbridge.yml template.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

pub const TEMPLATE: &str = r#"resolver:
  # Command run once per lookup; the image reference is appended last.
  program: regctl
  args: [image, config]
  # Credentials and TLS overrides are passed as REGBRIDGE_USERNAME,
  # REGBRIDGE_PASSWORD, REGBRIDGE_TLS_HOSTNAME and REGBRIDGE_TLS_STATE.
  timeout: 10s

workers:
  max_blocking_threads: 512
  thread_name: regbridge-worker
  keep_alive: 10s
"#;

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, TEMPLATE)?;

    Ok(())
}
