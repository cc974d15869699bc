// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup, host construction, and callback recorders.

use parking_lot::Mutex;
use regbridge::config::WorkerConfig;
use regbridge::host::Host;
use std::sync::{Arc, Once};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("regbridge=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A host with default worker settings.
#[allow(dead_code)]
pub fn host() -> Host {
    init_tracing();
    Host::new(&WorkerConfig::default()).unwrap()
}

#[allow(dead_code)]
pub type Call = (Option<String>, Option<String>);

/// Records every `(error, value)` pair a completion callback receives.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<Call>>>);

#[allow(dead_code)]
impl Calls {
    pub fn callback(&self) -> impl FnOnce(Option<String>, Option<String>) + Send + 'static {
        let calls = self.clone();
        move |err, value| calls.0.lock().push((err, value))
    }

    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}
