// src/exec/handle.rs

//! Asynchronous, cancellable execution handles.
//!
//! An [`ExecutionHandle`] represents "a value that will exist later, possibly
//! never (cancelled) or as an error". Handles are created in pairs with a
//! [`Completer`] write side, resolve exactly once, and are cheap to clone so
//! both the producing subsystem and the fallback engine can hold references.
//!
//! The two failure channels stay distinct: a recorded build failure travels
//! inside [`Resolution::Finished`] as a `Fail` outcome, while an
//! infrastructure fault travels as [`Resolution::Faulted`]. Cancellation is a
//! third terminal disposition, not an error.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use tokio::sync::Notify;

use crate::build::BuildOutcome;
use crate::exec::executor::ExecutorService;

/// Shareable infrastructure error: remote service unreachable, process launch
/// failure, serialization fault.
///
/// Distinct from a build failure, which is a recorded [`BuildOutcome`]. The
/// original cause is preserved verbatim behind an `Arc` so every clone handed
/// to a poller exposes the same cause chain.
#[derive(Debug, Clone)]
pub struct ExecutionError {
    cause: Arc<anyhow::Error>,
}

impl ExecutionError {
    pub fn new(cause: anyhow::Error) -> Self {
        Self {
            cause: Arc::new(cause),
        }
    }

    pub fn message(&self) -> String {
        self.cause.to_string()
    }

    /// The original cause, unwrapped and unmasked.
    pub fn cause(&self) -> &anyhow::Error {
        &self.cause
    }
}

impl std::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "execution error: {}", self.cause)
    }
}

impl std::error::Error for ExecutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let cause: &(dyn std::error::Error + 'static) = self.cause.as_ref().as_ref();
        Some(cause)
    }
}

impl PartialEq for ExecutionError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cause, &other.cause) || self.message() == other.message()
    }
}

/// Terminal disposition of an execution handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The attempt committed a result, successful or not.
    Finished(BuildOutcome),
    /// The attempt died without producing an outcome.
    Faulted(ExecutionError),
    /// The attempt was cancelled before committing a result.
    Cancelled,
}

impl Resolution {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Resolution::Cancelled)
    }
}

struct HandleShared {
    /// `None` while pending; written exactly once.
    state: Mutex<Option<Resolution>>,
    /// Wakes blocking waiters; paired with `state`.
    resolved_cv: Condvar,
    /// Wakes async waiters.
    resolved: Notify,
    /// Raised by `cancel()` so the producer can stop work it has in flight.
    cancel_requested: AtomicBool,
    cancel_signal: Notify,
}

impl HandleShared {
    fn resolve(&self, resolution: Resolution) -> bool {
        {
            let mut state = self.state.lock().unwrap();
            if state.is_some() {
                return false;
            }
            *state = Some(resolution);
        }
        self.resolved_cv.notify_all();
        self.resolved.notify_waiters();
        true
    }
}

/// Read side of an execution handle pair.
///
/// All clones observe the same resolution; repeated waits and polls on a
/// resolved handle return the identical [`Resolution`] every time.
#[derive(Clone)]
pub struct ExecutionHandle {
    shared: Arc<HandleShared>,
}

/// Write side of an execution handle pair. One per attempt; not cloneable.
///
/// Dropping a completer without resolving leaves the handle pending, which
/// mirrors an attempt that hangs without committing a result.
pub struct Completer {
    shared: Arc<HandleShared>,
}

impl ExecutionHandle {
    pub fn new_pair() -> (Completer, ExecutionHandle) {
        let shared = Arc::new(HandleShared {
            state: Mutex::new(None),
            resolved_cv: Condvar::new(),
            resolved: Notify::new(),
            cancel_requested: AtomicBool::new(false),
            cancel_signal: Notify::new(),
        });
        (
            Completer {
                shared: Arc::clone(&shared),
            },
            ExecutionHandle { shared },
        )
    }

    /// An already-resolved handle; used by attempts whose result is known up
    /// front.
    pub fn resolved(resolution: Resolution) -> ExecutionHandle {
        let (completer, handle) = Self::new_pair();
        completer.resolve(resolution);
        handle
    }

    /// The resolution if this handle has resolved, without waiting.
    pub fn poll_now(&self) -> Option<Resolution> {
        self.shared.state.lock().unwrap().clone()
    }

    /// True once resolved (finished, faulted, or cancelled). Side-effect-free.
    pub fn is_done(&self) -> bool {
        self.shared.state.lock().unwrap().is_some()
    }

    /// Wait for the resolution without blocking a worker thread.
    pub async fn wait(&self) -> Resolution {
        loop {
            let notified = self.shared.resolved.notified();
            tokio::pin!(notified);
            // Register interest before checking state so a resolve between
            // the check and the await cannot be missed.
            notified.as_mut().enable();
            if let Some(resolution) = self.poll_now() {
                return resolution;
            }
            notified.await;
        }
    }

    /// Blocking wait for synchronous callers at the outermost boundary.
    ///
    /// Never call this from a runtime worker thread; internal composition
    /// goes through [`ExecutionHandle::then_on`] instead.
    pub fn wait_blocking(&self) -> Resolution {
        let mut state = self.shared.state.lock().unwrap();
        while state.is_none() {
            state = self.shared.resolved_cv.wait(state).unwrap();
        }
        state.clone().unwrap()
    }

    /// Best-effort cancellation; idempotent.
    ///
    /// If the attempt has not yet committed a result, the handle resolves
    /// [`Resolution::Cancelled`] immediately and the producer is signalled to
    /// stop. Cancelling a resolved handle is a no-op.
    pub fn cancel(&self) {
        self.cancel_now();
    }

    /// As [`cancel`](Self::cancel), reporting whether this call performed the
    /// transition.
    pub(crate) fn cancel_now(&self) -> bool {
        let transitioned = self.shared.resolve(Resolution::Cancelled);
        if transitioned {
            self.shared.cancel_requested.store(true, Ordering::SeqCst);
            self.shared.cancel_signal.notify_waiters();
        }
        transitioned
    }

    /// Attach a continuation that runs on `executor` once this handle
    /// resolves, producing a new handle for the continuation's resolution.
    ///
    /// The continuation observes the full [`Resolution`] and so can map both
    /// the success and the failure channel.
    pub fn then_on<F, Fut>(&self, executor: &dyn ExecutorService, f: F) -> ExecutionHandle
    where
        F: FnOnce(Resolution) -> Fut + Send + 'static,
        Fut: Future<Output = Resolution> + Send + 'static,
    {
        let (completer, next) = ExecutionHandle::new_pair();
        let source = self.clone();
        executor.spawn(Box::pin(async move {
            let resolution = source.wait().await;
            let mapped = f(resolution).await;
            completer.resolve(mapped);
        }));
        next
    }
}

impl std::fmt::Debug for ExecutionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionHandle")
            .field("state", &self.poll_now())
            .finish()
    }
}

impl Completer {
    /// Commit a resolution. Returns `true` iff this call resolved the handle;
    /// later calls are no-ops.
    pub fn resolve(&self, resolution: Resolution) -> bool {
        self.shared.resolve(resolution)
    }

    /// Commit a build outcome; a failed outcome is still a result.
    pub fn finish(&self, outcome: BuildOutcome) -> bool {
        self.resolve(Resolution::Finished(outcome))
    }

    /// Commit an infrastructure fault.
    pub fn fault(&self, error: ExecutionError) -> bool {
        self.resolve(Resolution::Faulted(error))
    }

    /// True once a consumer has requested cancellation.
    pub fn is_cancel_requested(&self) -> bool {
        self.shared.cancel_requested.load(Ordering::SeqCst)
    }

    /// Wait until a consumer requests cancellation.
    ///
    /// Producers typically `select!` this against their own work and stop
    /// early when it fires.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.shared.cancel_signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_cancel_requested() {
                return;
            }
            notified.await;
        }
    }
}

/// Boxed future type used when handing work to an [`ExecutorService`].
pub type BoxedUnitFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
