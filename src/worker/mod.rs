pub mod state;
pub mod wake_signal;
pub mod work_loop;

pub use state::{AtomicWorkerState, WorkerState};
pub use wake_signal::WakeSignal;
pub use work_loop::{WorkLoop, WorkerContext};

use thiserror::Error;
use parking_lot::Mutex;

use std::{
    any::Any,
    cell::Cell,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle}
};

use crate::policy::{self, ExitPolicy};

thread_local! {
    // Address of the state owned by the worker running on this thread, 0 if none.
    static CURRENT_WORKER: Cell<usize> = const { Cell::new(0) };
}

#[derive(Debug, Error)]
pub enum WorkerStartErrorType {
    #[error("Failed to spawn worker thread: {0}")]
    SpawnFailed(#[source] std::io::Error),
}

#[derive(Debug, Error)]
#[error("Error while starting worker {name}: {source}")]
pub struct WorkerStartError {
    pub name: String,

    #[source]
    pub source: WorkerStartErrorType,
}

impl WorkerStartError {
    pub fn new(name: &str, source: WorkerStartErrorType) -> Self {
        Self { name: name.to_owned(), source }
    }

    pub fn spawn_failed(name: &str, source: std::io::Error) -> Self {
        Self::new(name, WorkerStartErrorType::SpawnFailed(source))
    }
}

#[derive(Debug, Error)]
pub enum WorkerStopErrorType {
    #[error("Worker cannot be stopped from its own thread")]
    SelfStop,
}

#[derive(Debug, Error)]
#[error("Error while stopping worker {name}: {source}")]
pub struct WorkerStopError {
    pub name: String,

    #[source]
    pub source: WorkerStopErrorType,
}

impl WorkerStopError {
    pub fn new(name: &str, source: WorkerStopErrorType) -> Self {
        Self { name: name.to_owned(), source }
    }

    pub fn self_stop(name: &str) -> Self {
        Self::new(name, WorkerStopErrorType::SelfStop)
    }
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to start worker: {0}")]
    WorkerStartError(#[from] WorkerStartError),

    #[error("Failed to stop worker: {0}")]
    WorkerStopError(#[from] WorkerStopError),
}

// The guard owns the thread handle, so a spawn and a join never interleave.
pub struct Worker<W: WorkLoop> {
    name: Arc<str>,
    work: Arc<W>,
    state: Arc<AtomicWorkerState>,
    policy: ExitPolicy,
    guard: Mutex<Option<JoinHandle<()>>>,
}

impl<W: WorkLoop> Worker<W> {

    pub fn new(name: impl Into<String>, work: W) -> Self {
        Self::with_policy(name, work, policy::current())
    }

    pub fn with_policy(name: impl Into<String>, work: W, policy: ExitPolicy) -> Self {
        Self {
            name: Arc::from(name.into()),
            work: Arc::new(work),
            state: Arc::new(AtomicWorkerState::default()),
            policy,
            guard: Mutex::new(None),
        }
    }

    // Workers of a family are told apart by index: "cuda0", "cuda1"...
    pub fn indexed(name: &str, index: usize, work: W) -> Self {
        Self::new(format!("{name}{index}"), work)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn work(&self) -> &W { &self.work }
    pub fn policy(&self) -> ExitPolicy { self.policy }

    pub fn state(&self) -> WorkerState { self.state.load() }

    pub fn should_stop(&self) -> bool { self.state.is(WorkerState::Stopping) }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), WorkerState::Starting | WorkerState::Started)
    }

    fn on_own_thread(&self) -> bool {
        let id = Arc::as_ptr(&self.state) as usize;
        CURRENT_WORKER.with(|current| current.get() == id)
    }

    // Returns once the new thread has published Started.
    pub fn start_working(&self) -> Result<(), WorkerStartError> {
        if self.on_own_thread() { return Ok(()) }

        let mut handle = self.guard.lock();

        if self.is_running() {
            info!("cl-worker: Worker {} already running", self.name);
            return Ok(());
        }

        // A loop that returned by itself leaves a finished thread behind.
        if let Some(previous) = handle.take() {
            if previous.join().is_err() {
                warn!("cl-worker: Worker {}: previous thread terminated abnormally", self.name);
            }
        }

        self.state.store(WorkerState::Starting);

        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
        let ctx = WorkerContext::new(
            Arc::clone(&self.name),
            Arc::clone(&self.state),
            self.policy
        );
        let work = Arc::clone(&self.work);
        let state = Arc::clone(&self.state);

        let spawned = thread::Builder::new()
            .name(self.name.to_string())
            .spawn(move || Self::run(work, ctx, state, started_tx));

        let spawned = match spawned {
            Ok(spawned) => spawned,
            Err(e) => {
                // Starting -> Stopped: the only edge outside the lifecycle, no thread ever ran.
                self.state.store(WorkerState::Stopped);
                error!("cl-worker: Worker {}: failed to spawn thread: {}", self.name, e);
                return Err(WorkerStartError::spawn_failed(&self.name, e));
            }
        };

        if started_rx.recv().is_err() {
            warn!("cl-worker: Worker {}: thread exited before reporting start", self.name);
        }

        *handle = Some(spawned);
        Ok(())
    }

    pub fn stop_working(&self) -> Result<(), WorkerStopError> {
        if self.on_own_thread() {
            return Err(WorkerStopError::self_stop(&self.name));
        }

        let mut handle = self.guard.lock();

        if self.state.transition(WorkerState::Started, WorkerState::Stopping) {
            info!("cl-worker: Worker {} stopping", self.name);
            self.work.on_stop();
        }

        if let Some(running) = handle.take() {
            if running.join().is_err() {
                warn!("cl-worker: Worker {}: thread terminated abnormally", self.name);
            }
        }

        self.state.store(WorkerState::Stopped);
        Ok(())
    }

    fn run(
        work: Arc<W>,
        ctx: WorkerContext,
        state: Arc<AtomicWorkerState>,
        started: crossbeam_channel::Sender<()>
    ) {
        CURRENT_WORKER.with(|current| current.set(Arc::as_ptr(&state) as usize));

        state.transition(WorkerState::Starting, WorkerState::Started);
        let _ = started.send(());
        drop(started);

        info!("cl-worker: Worker {} started", ctx.name());

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| work.work_loop(&ctx))) {
            error!(
                "cl-worker: Worker {}: work loop panicked: {}",
                ctx.name(),
                panic_message(payload.as_ref())
            );
            if ctx.exit_on_error() {
                error!("cl-worker: Worker {}: exiting process", ctx.name());
                std::process::exit(1);
            }
        }

        // Loop returned without being asked to.
        state.transition(WorkerState::Started, WorkerState::Stopping);
        state.store(WorkerState::Stopped);

        CURRENT_WORKER.with(|current| current.set(0));
        info!("cl-worker: Worker {} stopped", ctx.name());
    }
}

impl<W: WorkLoop> Drop for Worker<W> {
    fn drop(&mut self) {
        if let Err(e) = self.stop_working() {
            error!("cl-worker: {}", e);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() { return message }
    if let Some(message) = payload.downcast_ref::<String>() { return message }
    "unknown panic"
}
