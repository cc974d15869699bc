// ABOUTME: Integration tests for dispatching lookups through a host loop.
// ABOUTME: Covers exactly-once delivery, non-blocking submission, and isolation.

mod support;

use parking_lot::Mutex;
use regbridge::dispatch::SubmitError;
use regbridge::request::{ArgumentError, ImageInfoRequest};
use regbridge::resolver::{self, ResolveError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use support::{Calls, host};

const ALPINE: &str = "docker.io/library/alpine:latest";
const DIGEST_PAYLOAD: &str = r#"{"digest":"sha256:abc"}"#;

mod scenarios {
    use super::*;

    /// Test: anonymous lookup delivers the resolver payload as (null, value).
    #[test]
    fn anonymous_lookup_delivers_payload() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|req| {
            if req.image_ref() == ALPINE && req.credentials().is_none() && req.tls().is_empty() {
                Ok(DIGEST_PAYLOAD.to_string())
            } else {
                Err(ResolveError::new("unexpected request"))
            }
        }));

        let calls = Calls::default();
        dispatcher
            .submit_anonymous(ALPINE, "", "", calls.callback())
            .unwrap();
        host.run_until_idle();

        assert_eq!(calls.take(), vec![(None, Some(DIGEST_PAYLOAD.to_string()))]);
    }

    /// Test: rejected credentials arrive as (message, null).
    #[test]
    fn bad_credentials_deliver_error() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|req| match req.credentials() {
            Some(c) if c.username() == "u" && c.password() == "bad" => {
                Err(ResolveError::new("unauthorized"))
            }
            _ => Ok(DIGEST_PAYLOAD.to_string()),
        }));

        let calls = Calls::default();
        dispatcher
            .submit_authenticated(ALPINE, "u", "bad", "", "", calls.callback())
            .unwrap();
        host.run_until_idle();

        assert_eq!(calls.take(), vec![(Some("unauthorized".to_string()), None)]);
    }

    /// Test: the TLS state override reaches the resolver exactly as given.
    #[test]
    fn tls_state_reaches_resolver() {
        let mut host = host();
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let dispatcher = host.dispatcher(resolver::from_fn(move |req| {
            *record.lock() = req.tls().state().map(str::to_string);
            Ok(DIGEST_PAYLOAD.to_string())
        }));

        let calls = Calls::default();
        dispatcher
            .submit_anonymous(ALPINE, "", "insecure", calls.callback())
            .unwrap();
        host.run_until_idle();

        assert_eq!(*seen.lock(), Some("insecure".to_string()));
        assert_eq!(calls.take().len(), 1);
    }

    /// Test: whitespace overrides are not treated as unset.
    #[test]
    fn whitespace_overrides_pass_through() {
        let mut host = host();
        let seen = Arc::new(Mutex::new(None));
        let record = Arc::clone(&seen);
        let dispatcher = host.dispatcher(resolver::from_fn(move |req| {
            *record.lock() = Some((
                req.tls().hostname().map(str::to_string),
                req.tls().state().map(str::to_string),
            ));
            Ok(String::new())
        }));

        dispatcher
            .submit_anonymous(ALPINE, " ", "\t", |_, _| {})
            .unwrap();
        host.run_until_idle();

        assert_eq!(
            *seen.lock(),
            Some((Some(" ".to_string()), Some("\t".to_string())))
        );
    }
}

mod delivery {
    use super::*;

    /// Test: every submission yields exactly one callback with exactly one side set.
    #[test]
    fn every_submission_completes_exactly_once() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|req| {
            if req.image_ref().ends_with(['1', '3', '5', '7', '9']) {
                Err(ResolveError::new(format!("{} not found", req.image_ref())))
            } else {
                Ok(format!("{{\"ref\":\"{}\"}}", req.image_ref()))
            }
        }));

        let recorders: Vec<Calls> = (0..20).map(|_| Calls::default()).collect();
        for (i, calls) in recorders.iter().enumerate() {
            dispatcher
                .submit_anonymous(&format!("image-{i}"), "", "", calls.callback())
                .unwrap();
        }
        host.run_until_idle();

        for (i, calls) in recorders.iter().enumerate() {
            let received = calls.take();
            assert_eq!(received.len(), 1, "image-{i} completed {} times", received.len());
            let (err, value) = &received[0];
            assert!(err.is_some() != value.is_some(), "image-{i}: {err:?} / {value:?}");
            assert_eq!(err.is_some(), i % 2 == 1);
        }
        assert_eq!(host.in_flight(), 0);
    }

    /// Test: the resolver runs on a worker thread and the callback on the host thread.
    #[test]
    fn callback_runs_on_host_thread() {
        let mut host = host();
        let host_thread = thread::current().id();

        let resolver_thread: Arc<Mutex<Option<ThreadId>>> = Arc::default();
        let record = Arc::clone(&resolver_thread);
        let dispatcher = host.dispatcher(resolver::from_fn(move |_| {
            *record.lock() = Some(thread::current().id());
            Ok(String::new())
        }));

        let callback_thread: Arc<Mutex<Option<ThreadId>>> = Arc::default();
        let record = Arc::clone(&callback_thread);
        dispatcher
            .submit_anonymous(ALPINE, "", "", move |_, _| {
                *record.lock() = Some(thread::current().id());
            })
            .unwrap();
        host.run_until_idle();

        let resolver_thread = resolver_thread.lock().unwrap();
        assert_ne!(resolver_thread, host_thread);
        assert_eq!(*callback_thread.lock(), Some(host_thread));
    }

    /// Test: a panicking resolver still produces exactly one error callback.
    #[test]
    fn panicking_resolver_reports_error() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|_| panic!("registry exploded")));

        let calls = Calls::default();
        dispatcher
            .submit_anonymous(ALPINE, "", "", calls.callback())
            .unwrap();
        host.run_until_idle();

        let received = calls.take();
        assert_eq!(received.len(), 1);
        let (err, value) = &received[0];
        assert!(err.as_deref().unwrap().contains("registry exploded"));
        assert!(value.is_none());
    }

    /// Test: work submitted from inside a callback is delivered by the same run.
    #[test]
    fn callback_can_submit_follow_up() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|req| Ok(req.image_ref().to_string())));

        let calls = Calls::default();
        let follow_up = dispatcher.clone();
        let inner = calls.clone();
        dispatcher
            .submit_anonymous("first", "", "", move |_, _| {
                follow_up
                    .submit_anonymous("second", "", "", inner.callback())
                    .unwrap();
            })
            .unwrap();
        host.run_until_idle();

        assert_eq!(calls.take(), vec![(None, Some("second".to_string()))]);
    }

    /// Test: the channel form resolves once the host has delivered.
    #[test]
    fn lookup_receiver_resolves_after_delivery() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|_| Ok(DIGEST_PAYLOAD.to_string())));

        let mut receiver = dispatcher
            .lookup(ImageInfoRequest::new(ALPINE).unwrap())
            .unwrap();
        host.run_until_idle();

        assert_eq!(receiver.try_take(), Some(Ok(DIGEST_PAYLOAD.to_string())));
    }

    /// Test: the channel form can be awaited.
    #[test]
    fn lookup_receiver_is_awaitable() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|_| Err(ResolveError::new("not found"))));

        let receiver = dispatcher
            .lookup(ImageInfoRequest::new(ALPINE).unwrap())
            .unwrap();
        host.run_until_idle();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let outcome = runtime.block_on(receiver);
        assert_eq!(outcome, Err(ResolveError::new("not found")));
    }
}

mod non_blocking {
    use super::*;

    /// Test: submission returns while the resolver is still sleeping.
    #[test]
    fn submit_returns_before_resolver_finishes() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|_| {
            thread::sleep(Duration::from_millis(300));
            Ok(DIGEST_PAYLOAD.to_string())
        }));

        let calls = Calls::default();
        let start = Instant::now();
        dispatcher
            .submit_anonymous(ALPINE, "", "", calls.callback())
            .unwrap();
        assert!(start.elapsed() < Duration::from_millis(200));

        // Nothing is delivered until the host loop runs and the resolver returns.
        assert_eq!(host.poll(), 0);
        assert!(calls.is_empty());
        assert_eq!(host.in_flight(), 1);

        host.run_until_idle();
        assert_eq!(calls.take().len(), 1);
    }

    /// Test: host events keep being processed while a resolver blocks.
    #[test]
    fn host_processes_events_during_lookup() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|_| {
            thread::sleep(Duration::from_millis(300));
            Ok(String::new())
        }));

        let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();
        let record = Arc::clone(&order);
        dispatcher
            .submit_anonymous(ALPINE, "", "", move |_, _| record.lock().push("completion"))
            .unwrap();

        let handle = host.handle();
        let record = Arc::clone(&order);
        let poster = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            handle.post(move || record.lock().push("tick"))
        });

        host.run_until_idle();
        assert!(poster.join().unwrap());
        assert_eq!(*order.lock(), vec!["tick", "completion"]);
    }

    /// Test: two lookups of the same image with different overrides run side by side
    /// and each sees only its own override.
    #[test]
    fn concurrent_lookups_stay_independent() {
        let mut host = host();
        // Both resolver calls must be in flight at the same time to pass the barrier.
        let barrier = Arc::new(Barrier::new(2));
        let dispatcher = host.dispatcher(resolver::from_fn(move |req| {
            barrier.wait();
            Ok(format!("tls={}", req.tls().state().unwrap_or("")))
        }));

        let insecure = Calls::default();
        let disabled = Calls::default();
        dispatcher
            .submit_anonymous(ALPINE, "", "insecure", insecure.callback())
            .unwrap();
        dispatcher
            .submit_anonymous(ALPINE, "", "disabled", disabled.callback())
            .unwrap();
        host.run_until_idle();

        assert_eq!(insecure.take(), vec![(None, Some("tls=insecure".to_string()))]);
        assert_eq!(disabled.take(), vec![(None, Some("tls=disabled".to_string()))]);
    }
}

mod arguments {
    use super::*;

    /// Test: an empty image reference fails synchronously and schedules nothing.
    #[test]
    fn empty_image_ref_fails_synchronously() {
        let mut host = host();
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&resolver_calls);
        let dispatcher = host.dispatcher(resolver::from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        }));

        let calls = Calls::default();
        let err = dispatcher
            .submit_anonymous("", "", "", calls.callback())
            .unwrap_err();
        assert_eq!(err, SubmitError::InvalidArgument(ArgumentError::EmptyImageRef));
        assert_eq!(host.in_flight(), 0);

        let err = dispatcher
            .submit_authenticated("", "u", "p", "", "", calls.callback())
            .unwrap_err();
        assert_eq!(err, SubmitError::InvalidArgument(ArgumentError::EmptyImageRef));

        host.run_until_idle();
        assert!(calls.is_empty());
        assert_eq!(resolver_calls.load(Ordering::SeqCst), 0);
    }

    /// Test: empty credentials still reach the resolver as the authenticated shape.
    #[test]
    fn empty_credentials_are_passed_on() {
        let mut host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|req| match req.credentials() {
            Some(c) if !c.is_usable() => Ok("anonymous".to_string()),
            Some(_) => Ok("authenticated".to_string()),
            None => Err(ResolveError::new("credentials missing")),
        }));

        let calls = Calls::default();
        dispatcher
            .submit_authenticated(ALPINE, "", "", "", "", calls.callback())
            .unwrap();
        host.run_until_idle();

        assert_eq!(calls.take(), vec![(None, Some("anonymous".to_string()))]);
    }
}

mod shutdown {
    use super::*;

    /// Test: once the host is dropped, submissions are refused instead of lost.
    #[test]
    fn submit_after_host_dropped_fails_synchronously() {
        let host = host();
        let resolver_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&resolver_calls);
        let dispatcher = host.dispatcher(resolver::from_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        }));
        drop(host);

        let calls = Calls::default();
        let err = dispatcher
            .submit_anonymous(ALPINE, "", "", calls.callback())
            .unwrap_err();
        assert_eq!(err, SubmitError::HostGone);

        let err = dispatcher
            .submit_authenticated(ALPINE, "u", "p", "", "", calls.callback())
            .unwrap_err();
        assert_eq!(err, SubmitError::HostGone);

        thread::sleep(Duration::from_millis(100));
        assert!(dispatcher.host().is_closed());
        assert_eq!(dispatcher.host().in_flight(), 0);
        assert!(calls.is_empty());
        assert_eq!(resolver_calls.load(Ordering::SeqCst), 0);
    }

    /// Test: the channel form reports the refusal rather than handing out a
    /// receiver that never resolves.
    #[test]
    fn lookup_after_host_dropped_fails_synchronously() {
        let host = host();
        let dispatcher = host.dispatcher(resolver::from_fn(|_| Ok(String::new())));
        drop(host);

        let err = dispatcher
            .lookup(ImageInfoRequest::new(ALPINE).unwrap())
            .unwrap_err();
        assert_eq!(err, SubmitError::HostGone);
    }
}
