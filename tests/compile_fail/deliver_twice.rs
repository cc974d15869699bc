// ABOUTME: Compile-fail test verifying a Completed unit delivers only once.
// ABOUTME: deliver() consumes the unit along with its completion.

use regbridge::request::ImageInfoRequest;
use regbridge::resolver::{self, ResolveError};
use regbridge::unit::{Completion, WorkUnit};

fn main() {
    let request = ImageInfoRequest::new("alpine").unwrap();
    let unit = WorkUnit::new(request, Completion::callback(|_, _| {}));
    let stub = resolver::from_fn(|_| Ok::<_, ResolveError>(String::new()));
    let done = unit.begin().run(&stub);

    done.deliver();
    // ERROR: use of moved value
    done.deliver();
}
