// ABOUTME: Entry point for the regbridge CLI application.
// ABOUTME: Parses arguments, runs lookups on a host loop, and prints results.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use regbridge::config::{self, CONFIG_FILENAME, Config};
use regbridge::error::{Error, Result};
use regbridge::host::Host;
use regbridge::output::{Output, OutputMode};
use regbridge::request::ArgumentError;
use regbridge::resolver::{CommandResolver, ResolveError};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, force)?;
            println!("Created {CONFIG_FILENAME}");
            Ok(())
        }
        Commands::Inspect {
            images,
            username,
            password,
            tls_hostname,
            tls_state,
            json,
            quiet,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Normal
            };
            let credentials = username.zip(password);

            inspect(
                &config,
                &images,
                credentials,
                tls_hostname.as_deref().unwrap_or(""),
                tls_state.as_deref().unwrap_or(""),
                Output::new(mode),
            )
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path),
        None => Config::discover(&env::current_dir()?),
    }
}

/// Submit every image at once and print results as they complete.
fn inspect(
    config: &Config,
    images: &[String],
    credentials: Option<(String, String)>,
    tls_hostname: &str,
    tls_state: &str,
    mut output: Output,
) -> Result<()> {
    if images.iter().any(String::is_empty) {
        return Err(ArgumentError::EmptyImageRef.into());
    }

    let mut host = Host::new(&config.workers)?;
    let dispatcher = host.dispatcher(CommandResolver::from_config(&config.resolver));
    let failed = Arc::new(AtomicUsize::new(0));

    output.start_timer();
    output.progress(&format!(
        "Looking up {} image(s) with {}",
        images.len(),
        config.resolver.program
    ));

    for image in images {
        let on_complete = {
            let image = image.clone();
            let output = output.clone();
            let failed = Arc::clone(&failed);
            move |err: Option<String>, value: Option<String>| {
                let outcome = match (err, value) {
                    (Some(message), _) => Err(ResolveError::new(message)),
                    (None, Some(payload)) => Ok(payload),
                    (None, None) => Err(ResolveError::new("empty completion")),
                };
                if outcome.is_err() {
                    failed.fetch_add(1, Ordering::SeqCst);
                }
                output.lookup(&image, &outcome);
            }
        };

        match &credentials {
            Some((user, pass)) => dispatcher.submit_authenticated(
                image,
                user,
                pass,
                tls_hostname,
                tls_state,
                on_complete,
            ),
            None => dispatcher.submit_anonymous(image, tls_hostname, tls_state, on_complete),
        }?;
    }

    host.run_until_idle();

    let failed = failed.load(Ordering::SeqCst);
    output.summary(images.len(), failed);
    if failed > 0 {
        return Err(Error::LookupsFailed {
            failed,
            total: images.len(),
        });
    }
    Ok(())
}
