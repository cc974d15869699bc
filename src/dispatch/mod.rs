// ABOUTME: Task dispatcher: turns a lookup call into a scheduled work unit.
// ABOUTME: Both call shapes share one request type and one scheduling path.

use std::sync::Arc;

use thiserror::Error;

use crate::host::HostHandle;
use crate::request::{ArgumentError, ImageInfoRequest};
use crate::resolver::Resolver;
use crate::unit::{Completion, CompletionReceiver, WorkUnit};

/// A lookup that was refused before anything was scheduled. The completion is
/// dropped uncalled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    InvalidArgument(#[from] ArgumentError),

    #[error("host has shut down, lookup not scheduled")]
    HostGone,
}

/// Schedules lookups on a host's workers. Cheap to clone.
///
/// Every submit method returns as soon as the unit is queued; the outcome only
/// ever arrives through the completion, on the host thread.
#[derive(Clone)]
pub struct Dispatcher {
    host: HostHandle,
    resolver: Arc<dyn Resolver>,
}

impl Dispatcher {
    pub fn new(host: HostHandle, resolver: Arc<dyn Resolver>) -> Self {
        Self { host, resolver }
    }

    /// Schedule one unit for `request`.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::HostGone` if the host has been dropped.
    pub fn submit(
        &self,
        request: ImageInfoRequest,
        completion: Completion,
    ) -> Result<(), SubmitError> {
        let unit = WorkUnit::new(request, completion);
        self.host
            .offload(unit, Arc::clone(&self.resolver))
            .map_err(|unit| {
                tracing::warn!(
                    unit = %unit.id(),
                    image = unit.request().image_ref(),
                    "Host has shut down, refusing lookup"
                );
                SubmitError::HostGone
            })
    }

    /// Anonymous lookup. Empty overrides mean "resolver default".
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::InvalidArgument` for an empty image reference and
    /// `SubmitError::HostGone` after the host is dropped. Nothing is scheduled
    /// and `on_complete` is never called in either case.
    pub fn submit_anonymous<F>(
        &self,
        image_ref: &str,
        tls_hostname: &str,
        tls_state: &str,
        on_complete: F,
    ) -> Result<(), SubmitError>
    where
        F: FnOnce(Option<String>, Option<String>) + Send + 'static,
    {
        let request = ImageInfoRequest::anonymous(image_ref, tls_hostname, tls_state)?;
        self.submit(request, Completion::callback(on_complete))
    }

    /// Authenticated lookup. Empty credentials are passed on as-is; whether they
    /// count as anonymous is the resolver's call.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::submit_anonymous`].
    pub fn submit_authenticated<F>(
        &self,
        image_ref: &str,
        username: &str,
        password: &str,
        tls_hostname: &str,
        tls_state: &str,
        on_complete: F,
    ) -> Result<(), SubmitError>
    where
        F: FnOnce(Option<String>, Option<String>) + Send + 'static,
    {
        let request =
            ImageInfoRequest::authenticated(image_ref, username, password, tls_hostname, tls_state)?;
        self.submit(request, Completion::callback(on_complete))
    }

    /// Schedule `request` and get an awaitable receiver for its outcome.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::submit`].
    pub fn lookup(&self, request: ImageInfoRequest) -> Result<CompletionReceiver, SubmitError> {
        let (completion, receiver) = Completion::channel();
        self.submit(request, completion)?;
        Ok(receiver)
    }

    pub fn host(&self) -> &HostHandle {
        &self.host
    }
}
