// ABOUTME: Host event loop: the primary execution context completions run on.
// ABOUTME: Owns the worker pool that blocking resolver calls are offloaded to.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::mpsc;

use crate::config::WorkerConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::resolver::Resolver;
use crate::unit::{Completed, Created, WorkUnit};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Events processed on the host thread, in arrival order.
enum HostEvent {
    /// A finished unit whose completion must fire on the host thread.
    Deliver(WorkUnit<Completed>),
    /// Arbitrary work posted to the host thread.
    Task(Task),
}

/// Cloneable, thread-safe handle to a [`Host`].
#[derive(Clone)]
pub struct HostHandle {
    events: mpsc::UnboundedSender<HostEvent>,
    in_flight: Arc<AtomicUsize>,
    workers: Handle,
}

impl HostHandle {
    /// Queue a task to run on the host thread.
    ///
    /// Returns false if the host has been dropped.
    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.events.send(HostEvent::Task(Box::new(task))).is_ok()
    }

    /// Number of units scheduled but not yet delivered.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Whether the host has shut down. Nothing submitted after that is delivered.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }

    /// Run `unit` on a worker thread and queue it for delivery when done.
    ///
    /// Returns immediately. The resolver is only ever called on the worker.
    /// Hands the unit back untouched if the host has already shut down.
    pub(crate) fn offload(
        &self,
        unit: WorkUnit<Created>,
        resolver: Arc<dyn Resolver>,
    ) -> std::result::Result<(), WorkUnit<Created>> {
        if self.is_closed() {
            return Err(unit);
        }

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            unit = %unit.id(),
            image = unit.request().image_ref(),
            "Scheduling lookup"
        );

        let events = self.events.clone();
        self.workers.spawn_blocking(move || {
            let completed = unit.begin().run(resolver.as_ref());
            let id = completed.id();
            if events.send(HostEvent::Deliver(completed)).is_err() {
                tracing::warn!(unit = %id, "Host gone, dropping lookup result");
            }
        });
        Ok(())
    }
}

/// Single-threaded event loop standing in for the embedding process.
///
/// Completions only ever run inside [`Host::run_until_idle`] or [`Host::poll`],
/// on whichever thread calls them. Neither may be called from within an async
/// runtime.
pub struct Host {
    handle: HostHandle,
    events: mpsc::UnboundedReceiver<HostEvent>,
    runtime: Option<Runtime>,
}

impl Host {
    pub fn new(config: &WorkerConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .max_blocking_threads(config.max_blocking_threads.get())
            .thread_keep_alive(config.keep_alive)
            .thread_name(config.thread_name.clone())
            .build()
            .map_err(Error::WorkerPool)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = HostHandle {
            events: tx,
            in_flight: Arc::new(AtomicUsize::new(0)),
            workers: runtime.handle().clone(),
        };

        Ok(Self {
            handle,
            events: rx,
            runtime: Some(runtime),
        })
    }

    pub fn handle(&self) -> HostHandle {
        self.handle.clone()
    }

    /// Dispatcher that offloads lookups to this host's workers.
    pub fn dispatcher<R>(&self, resolver: R) -> Dispatcher
    where
        R: Resolver + 'static,
    {
        Dispatcher::new(self.handle(), Arc::new(resolver))
    }

    pub fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.post(task)
    }

    pub fn in_flight(&self) -> usize {
        self.handle.in_flight()
    }

    /// Process every event already queued, without blocking.
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.events.try_recv() {
            self.process(event);
            processed += 1;
        }
        processed
    }

    /// Process events until no unit is in flight and the queue is empty.
    ///
    /// Blocks the calling thread between events. Completions that submit more
    /// work keep the loop running until that work is delivered too.
    pub fn run_until_idle(&mut self) -> usize {
        let mut processed = self.poll();
        while self.in_flight() > 0 {
            match self.events.blocking_recv() {
                Some(event) => {
                    self.process(event);
                    processed += 1;
                }
                None => break,
            }
        }
        processed + self.poll()
    }

    fn process(&self, event: HostEvent) {
        match event {
            HostEvent::Deliver(unit) => {
                self.handle.in_flight.fetch_sub(1, Ordering::SeqCst);
                unit.deliver();
            }
            HostEvent::Task(task) => task(),
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        let pending = self.in_flight();
        if pending > 0 {
            tracing::warn!("Host dropped with {pending} lookup(s) in flight");
        }
        // Refuse new submissions before the workers go away.
        self.events.close();
        // Don't wait on resolvers that may never return.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}
