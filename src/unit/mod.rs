// ABOUTME: Deferred work units using the type state pattern.
// ABOUTME: Exports state markers, the unit itself, and one-shot completions.

mod completion;
mod state;
mod work_unit;

pub use completion::{Completion, CompletionReceiver, ImageInfoResult};
pub use state::{Completed, Created, Executing};
pub use work_unit::{UnitId, WorkUnit};
