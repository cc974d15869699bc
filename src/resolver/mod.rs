// ABOUTME: Resolver seam for registry metadata lookups.
// ABOUTME: A blocking call returning a serialized payload or an opaque error message.

mod command;

pub use command::{
    CommandResolver, CommandResolverError, ENV_PASSWORD, ENV_TLS_HOSTNAME, ENV_TLS_STATE,
    ENV_USERNAME,
};

use crate::request::ImageInfoRequest;

/// Failure reported by a resolver. The message is delivered to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResolveError {
    message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

impl From<String> for ResolveError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ResolveError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Resolves an image reference to its metadata document.
///
/// Implementations may block for as long as the registry exchange takes.
/// They are only ever invoked from a worker thread, never from the host loop.
pub trait Resolver: Send + Sync {
    fn resolve(&self, request: &ImageInfoRequest) -> Result<String, ResolveError>;
}

impl<F> Resolver for F
where
    F: Fn(&ImageInfoRequest) -> Result<String, ResolveError> + Send + Sync,
{
    fn resolve(&self, request: &ImageInfoRequest) -> Result<String, ResolveError> {
        self(request)
    }
}

/// Wrap a closure as a resolver, letting the compiler infer its signature.
pub fn from_fn<F>(f: F) -> F
where
    F: Fn(&ImageInfoRequest) -> Result<String, ResolveError> + Send + Sync,
{
    f
}
