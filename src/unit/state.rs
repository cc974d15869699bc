// ABOUTME: Work unit state marker types for the type state pattern.
// ABOUTME: Created -> Executing -> Completed, with no way back.

use super::completion::ImageInfoResult;

/// Parameters captured, not yet handed to a worker.
/// Available actions: `begin()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Created;

/// Resolver call in flight on a worker thread.
/// Available actions: `run()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Executing;

/// Outcome captured, waiting for delivery on the host thread.
/// Available actions: `deliver()`
#[derive(Debug)]
pub struct Completed {
    outcome: ImageInfoResult,
}

impl Completed {
    pub(crate) fn new(outcome: ImageInfoResult) -> Self {
        Self { outcome }
    }

    pub fn outcome(&self) -> &ImageInfoResult {
        &self.outcome
    }

    pub(crate) fn into_outcome(self) -> ImageInfoResult {
        self.outcome
    }
}
