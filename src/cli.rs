// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "regbridge")]
#[command(about = "Non-blocking container image metadata lookups")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of discovering one
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new regbridge.yml configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Fetch metadata for one or more images
    Inspect {
        /// Image references, e.g. docker.io/library/alpine:latest
        #[arg(required = true)]
        images: Vec<String>,

        /// Registry username
        #[arg(short, long, requires = "password")]
        username: Option<String>,

        /// Registry password or token
        #[arg(short, long, requires = "username")]
        password: Option<String>,

        /// Hostname to validate the registry certificate against
        #[arg(long)]
        tls_hostname: Option<String>,

        /// TLS trust mode passed to the resolver (e.g. enabled, disabled, insecure)
        #[arg(long)]
        tls_state: Option<String>,

        /// Print one JSON object per image
        #[arg(long, conflicts_with = "quiet")]
        json: bool,

        /// Print payloads only
        #[arg(short, long)]
        quiet: bool,
    },
}
