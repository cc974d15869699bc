// ABOUTME: Compile-fail test verifying a Completed unit cannot re-enter Executing.
// ABOUTME: begin() only exists on WorkUnit<Created>.

use regbridge::request::ImageInfoRequest;
use regbridge::resolver::{self, ResolveError};
use regbridge::unit::{Completion, WorkUnit};

fn main() {
    let request = ImageInfoRequest::new("alpine").unwrap();
    let unit = WorkUnit::new(request, Completion::callback(|_, _| {}));
    let stub = resolver::from_fn(|_| Ok::<_, ResolveError>(String::new()));
    let done = unit.begin().run(&stub);

    // ERROR: begin() doesn't exist on WorkUnit<Completed>
    let _ = done.begin();
}
