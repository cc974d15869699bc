// ABOUTME: Compile-fail test verifying an Executing unit runs at most once.
// ABOUTME: run() consumes the unit.

use regbridge::request::ImageInfoRequest;
use regbridge::resolver::{self, ResolveError};
use regbridge::unit::{Completion, WorkUnit};

fn main() {
    let request = ImageInfoRequest::new("alpine").unwrap();
    let unit = WorkUnit::new(request, Completion::callback(|_, _| {}));
    let stub = resolver::from_fn(|_| Ok::<_, ResolveError>(String::new()));
    let executing = unit.begin();

    let _first = executing.run(&stub);
    // ERROR: use of moved value
    let _second = executing.run(&stub);
}
