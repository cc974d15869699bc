// ABOUTME: Library root for regbridge - non-blocking image metadata lookups.
// ABOUTME: The CLI binary is in main.rs.

pub mod binding;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod output;
pub mod request;
pub mod resolver;
pub mod unit;
