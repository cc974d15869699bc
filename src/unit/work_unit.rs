// ABOUTME: Deferred work unit parameterized by its lifecycle state.
// ABOUTME: Owns its request copy and completion; each transition consumes self.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::request::ImageInfoRequest;
use crate::resolver::{ResolveError, Resolver};

use super::completion::{Completion, ImageInfoResult};
use super::state::{Completed, Created, Executing};

/// Process-unique identifier for a work unit, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// A single deferred lookup, parameterized by its current state.
///
/// The unit exclusively owns its request; nothing outside can observe or mutate
/// it once created. Every transition consumes the unit, so a unit that has run
/// can never run again and a completion can only fire from `Completed`.
#[derive(Debug)]
pub struct WorkUnit<S> {
    id: UnitId,
    request: ImageInfoRequest,
    completion: Completion,
    state: S,
}

impl<S> WorkUnit<S> {
    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn request(&self) -> &ImageInfoRequest {
        &self.request
    }

    fn transition<T>(self, state: T) -> WorkUnit<T> {
        WorkUnit {
            id: self.id,
            request: self.request,
            completion: self.completion,
            state,
        }
    }
}

// =============================================================================
// Created -> Executing
// =============================================================================

impl WorkUnit<Created> {
    pub fn new(request: ImageInfoRequest, completion: Completion) -> Self {
        WorkUnit {
            id: UnitId::next(),
            request,
            completion,
            state: Created,
        }
    }

    /// Mark the unit as picked up by a worker.
    pub fn begin(self) -> WorkUnit<Executing> {
        tracing::debug!(unit = %self.id, "Work unit executing");
        self.transition(Executing)
    }
}

// =============================================================================
// Executing -> Completed
// =============================================================================

impl WorkUnit<Executing> {
    /// Make the one blocking resolver call and capture its outcome.
    ///
    /// A panicking resolver is reported as an error outcome like any other failure.
    pub fn run<R>(self, resolver: &R) -> WorkUnit<Completed>
    where
        R: Resolver + ?Sized,
    {
        let outcome: ImageInfoResult =
            match panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(&self.request))) {
                Ok(outcome) => outcome,
                Err(payload) => Err(ResolveError::new(format!(
                    "resolver panicked: {}",
                    panic_message(payload.as_ref())
                ))),
            };

        match &outcome {
            Ok(payload) => {
                tracing::debug!(unit = %self.id, bytes = payload.len(), "Lookup succeeded")
            }
            Err(err) => tracing::debug!(unit = %self.id, error = %err, "Lookup failed"),
        }

        self.transition(Completed::new(outcome))
    }
}

// =============================================================================
// Completed -> delivered
// =============================================================================

impl WorkUnit<Completed> {
    pub fn outcome(&self) -> &ImageInfoResult {
        self.state.outcome()
    }

    /// Fire the completion and drop the unit.
    pub fn deliver(self) {
        tracing::debug!(unit = %self.id, "Delivering outcome");
        self.completion.complete(self.state.into_outcome());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
