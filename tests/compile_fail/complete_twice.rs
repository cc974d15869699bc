// ABOUTME: Compile-fail test verifying a completion fires only once.
// ABOUTME: complete() consumes the handle.

use regbridge::unit::Completion;

fn main() {
    let completion = Completion::callback(|_, _| {});

    completion.complete(Ok("{}".to_string()));
    // ERROR: use of moved value
    completion.complete(Ok("{}".to_string()));
}
