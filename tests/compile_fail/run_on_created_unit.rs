// ABOUTME: Compile-fail test verifying run cannot be called on a Created unit.
// ABOUTME: A unit must be picked up by a worker (begin) before it can run.

use regbridge::request::ImageInfoRequest;
use regbridge::resolver::{self, ResolveError};
use regbridge::unit::{Completion, WorkUnit};

fn main() {
    let request = ImageInfoRequest::new("alpine").unwrap();
    let unit = WorkUnit::new(request, Completion::callback(|_, _| {}));
    let stub = resolver::from_fn(|_| Ok::<_, ResolveError>(String::new()));

    // ERROR: run() doesn't exist on WorkUnit<Created>
    let _ = unit.run(&stub);
}
