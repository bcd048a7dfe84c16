use std::{fmt, sync::atomic::{AtomicU8, Ordering}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    Starting = 0,
    Started = 1,
    Stopping = 2,
    Stopped = 3,
}

impl From<u8> for WorkerState {
    fn from(state: u8) -> Self {
        match state {
            0 => WorkerState::Starting,
            1 => WorkerState::Started,
            2 => WorkerState::Stopping,
            3 => WorkerState::Stopped,
            _ => unreachable!(),
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Starting => write!(f, "Starting"),
            WorkerState::Started => write!(f, "Started"),
            WorkerState::Stopping => write!(f, "Stopping"),
            WorkerState::Stopped => write!(f, "Stopped"),
        }
    }
}

// Reads are relaxed: the flag is advisory and never orders other memory.
#[derive(Debug)]
pub struct AtomicWorkerState {
    state: AtomicU8,

    // Every change as (from, to), in the order it happened.
    #[cfg(test)]
    edges: parking_lot::Mutex<Vec<(WorkerState, WorkerState)>>,
}

impl AtomicWorkerState {

    pub fn new(state: WorkerState) -> Self {
        Self {
            state: AtomicU8::new(state as u8),
            #[cfg(test)]
            edges: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn load(&self) -> WorkerState {
        self.state.load(Ordering::Relaxed).into()
    }

    #[cfg(not(test))]
    pub fn store(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[cfg(test)]
    pub fn store(&self, state: WorkerState) {
        let mut edges = self.edges.lock();
        let previous = WorkerState::from(self.state.swap(state as u8, Ordering::AcqRel));
        if previous != state { edges.push((previous, state)) }
    }

    pub fn is(&self, state: WorkerState) -> bool {
        self.state.load(Ordering::Relaxed) == state as u8
    }

    // Moves `from` -> `to` only if the current state is still `from`.
    pub fn transition(&self, from: WorkerState, to: WorkerState) -> bool {
        #[cfg(test)]
        let mut edges = self.edges.lock();

        let moved = self.state.compare_exchange(
            from as u8,
            to as u8,
            Ordering::AcqRel,
            Ordering::Relaxed
        ).is_ok();

        #[cfg(test)]
        {
            if moved && from != to { edges.push((from, to)) }
        }

        moved
    }

    #[cfg(test)]
    pub(crate) fn edges(&self) -> Vec<(WorkerState, WorkerState)> {
        self.edges.lock().clone()
    }
}

// The four edges of the lifecycle.
#[cfg(test)]
pub(crate) fn is_lifecycle_edge(edge: (WorkerState, WorkerState)) -> bool {
    matches!(
        edge,
        (WorkerState::Stopped, WorkerState::Starting)
            | (WorkerState::Starting, WorkerState::Started)
            | (WorkerState::Started, WorkerState::Stopping)
            | (WorkerState::Stopping, WorkerState::Stopped)
    )
}

impl Default for AtomicWorkerState {
    fn default() -> Self { Self::new(WorkerState::Stopped) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_u8_conversion() {
        for state in [
            WorkerState::Starting,
            WorkerState::Started,
            WorkerState::Stopping,
            WorkerState::Stopped,
        ] {
            assert_eq!(WorkerState::from(state as u8), state);
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(format!("{}", WorkerState::Starting), "Starting");
        assert_eq!(format!("{}", WorkerState::Stopped), "Stopped");
    }

    #[test]
    fn test_default_is_stopped() {
        let state = AtomicWorkerState::default();
        assert_eq!(state.load(), WorkerState::Stopped);
        assert!(state.is(WorkerState::Stopped));
    }

    #[test]
    fn test_transition_only_from_expected_state() {
        let state = AtomicWorkerState::new(WorkerState::Started);
        assert!(!state.transition(WorkerState::Starting, WorkerState::Started));
        assert_eq!(state.load(), WorkerState::Started);

        assert!(state.transition(WorkerState::Started, WorkerState::Stopping));
        assert_eq!(state.load(), WorkerState::Stopping);
    }

    #[test]
    fn test_edges_record_changes_only() {
        let state = AtomicWorkerState::default();
        state.store(WorkerState::Stopped);
        state.store(WorkerState::Starting);
        assert!(state.transition(WorkerState::Starting, WorkerState::Started));
        assert!(!state.transition(WorkerState::Starting, WorkerState::Started));
        state.store(WorkerState::Stopped);

        assert_eq!(state.edges(), vec![
            (WorkerState::Stopped, WorkerState::Starting),
            (WorkerState::Starting, WorkerState::Started),
            (WorkerState::Started, WorkerState::Stopped),
        ]);
        assert!(is_lifecycle_edge((WorkerState::Stopped, WorkerState::Starting)));
        assert!(!is_lifecycle_edge((WorkerState::Started, WorkerState::Stopped)));
    }
}
