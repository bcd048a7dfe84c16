use std::sync::Arc;

use crate::policy::ExitPolicy;

use super::state::{AtomicWorkerState, WorkerState};

// `work_loop` must poll `should_stop` and return soon after it turns true.
// It must never call `stop_working` on its own worker, and must not drop the
// last `Arc` of its worker either: the drop's stop is refused on that thread,
// the handle is dropped and the thread runs on detached, logged only by an error.
pub trait WorkLoop: Send + Sync + 'static {

    fn work_loop(&self, ctx: &WorkerContext);

    // Called after Stopping is set, before the join.
    fn on_stop(&self) {}
}

#[derive(Debug, Clone)]
pub struct WorkerContext {
    name: Arc<str>,
    state: Arc<AtomicWorkerState>,
    policy: ExitPolicy,
}

impl WorkerContext {

    pub(crate) fn new(
        name: Arc<str>,
        state: Arc<AtomicWorkerState>,
        policy: ExitPolicy
    ) -> Self {
        Self { name, state, policy }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn state(&self) -> WorkerState { self.state.load() }
    pub fn should_stop(&self) -> bool { self.state.is(WorkerState::Stopping) }
    pub fn exit_on_error(&self) -> bool { self.policy.exit_on_error }
}
