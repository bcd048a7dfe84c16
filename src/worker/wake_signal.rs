use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

// A kick with nobody waiting stays pending until the next wait.
#[derive(Debug, Default)]
pub struct WakeSignal {
    pending: Mutex<bool>,
    cond: Condvar,
}

impl WakeSignal {

    pub fn new() -> Self { Self::default() }

    pub fn kick(&self) {
        *self.pending.lock() = true;
        self.cond.notify_one();
    }

    pub fn is_pending(&self) -> bool { *self.pending.lock() }

    // True if a kick was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();

        while !*pending {
            if self.cond.wait_until(&mut pending, deadline).timed_out() { break }
        }

        std::mem::replace(&mut *pending, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread};

    #[test]
    fn test_wait_times_out_without_kick() {
        let signal = WakeSignal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pending_kick_is_consumed() {
        let signal = WakeSignal::new();
        signal.kick();
        assert!(signal.is_pending());
        assert!(signal.wait_timeout(Duration::from_secs(5)));
        assert!(!signal.is_pending());
        assert!(!signal.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_kick_wakes_waiting_thread() {
        let signal = Arc::new(WakeSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || signal.wait_timeout(Duration::from_secs(10)))
        };

        thread::sleep(Duration::from_millis(20));
        let start = Instant::now();
        signal.kick();

        assert!(waiter.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
