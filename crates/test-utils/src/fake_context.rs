use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fallbuild::exec::{ExecutionHandle, ExecutorService, TokioExecutor};
use fallbuild::strategy::StrategyContext;

/// A programmable strategy context:
/// - the remote and local handles are supplied by the test and can be
///   pre-resolved or driven through their `Completer`s mid-test
/// - counts how many times `run_default_behavior` was invoked.
pub struct FakeStrategyContext {
    remote: ExecutionHandle,
    local: Mutex<Option<ExecutionHandle>>,
    local_invocations: AtomicUsize,
    executor: Arc<dyn ExecutorService>,
}

impl FakeStrategyContext {
    pub fn new(remote: ExecutionHandle, local: ExecutionHandle) -> Arc<Self> {
        Arc::new(Self {
            remote,
            local: Mutex::new(Some(local)),
            local_invocations: AtomicUsize::new(0),
            executor: Arc::new(TokioExecutor::new()),
        })
    }

    /// A context whose local path must never run; `run_default_behavior`
    /// panics if it is invoked.
    pub fn without_local(remote: ExecutionHandle) -> Arc<Self> {
        Arc::new(Self {
            remote,
            local: Mutex::new(None),
            local_invocations: AtomicUsize::new(0),
            executor: Arc::new(TokioExecutor::new()),
        })
    }

    /// How many times the strategy asked for the default (local) behaviour.
    pub fn local_invocations(&self) -> usize {
        self.local_invocations.load(Ordering::SeqCst)
    }
}

impl StrategyContext for FakeStrategyContext {
    fn remote_handle(&self) -> ExecutionHandle {
        self.remote.clone()
    }

    fn run_default_behavior(&self) -> ExecutionHandle {
        self.local_invocations.fetch_add(1, Ordering::SeqCst);
        self.local
            .lock()
            .unwrap()
            .clone()
            .expect("run_default_behavior invoked on a context without a local handle")
    }

    fn executor(&self) -> Arc<dyn ExecutorService> {
        Arc::clone(&self.executor)
    }
}
