// ABOUTME: Binding call error types with SNAFU pattern.
// ABOUTME: Separates unknown exports from rejected arguments for programmatic handling.

use snafu::Snafu;

use crate::request::ArgumentError;

/// Synchronous failure of a call into the binding surface.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CallError {
    #[snafu(display("no exported function named {name:?}"))]
    UnknownExport { name: String },

    #[snafu(display("{name}: {source}"))]
    Arguments { name: String, source: ArgumentError },

    #[snafu(display("{name}: host has shut down"))]
    HostGone { name: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// No function registered under the requested name.
    UnknownExport,
    /// Too many or too few arguments.
    WrongArity,
    /// An argument had the wrong type.
    WrongType,
    /// The image reference was an empty string.
    EmptyImageRef,
    /// The host event loop is gone; nothing can be scheduled.
    HostGone,
}

impl CallError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> CallErrorKind {
        match self {
            CallError::UnknownExport { .. } => CallErrorKind::UnknownExport,
            CallError::HostGone { .. } => CallErrorKind::HostGone,
            CallError::Arguments { source, .. } => match source {
                ArgumentError::WrongArity { .. } => CallErrorKind::WrongArity,
                ArgumentError::NotAString { .. } | ArgumentError::NotAFunction { .. } => {
                    CallErrorKind::WrongType
                }
                ArgumentError::EmptyImageRef => CallErrorKind::EmptyImageRef,
            },
        }
    }

    /// Returns the underlying argument error, if that is what failed.
    pub fn argument_error(&self) -> Option<&ArgumentError> {
        match self {
            CallError::Arguments { source, .. } => Some(source),
            CallError::UnknownExport { .. } | CallError::HostGone { .. } => None,
        }
    }
}
