use once_cell::sync::OnceCell;

use crate::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExitPolicy {
    pub exit_on_error: bool,
}

impl ExitPolicy {
    pub fn exit_on_error() -> Self { Self { exit_on_error: true } }
    pub fn keep_running() -> Self { Self { exit_on_error: false } }
}

static POLICY: OnceCell<ExitPolicy> = OnceCell::new();

// Sets the policy for the whole process. Must be called at most once,
// before any worker that should observe it is created.
pub fn init(policy: ExitPolicy) -> crate::Result<()> {
    POLICY.set(policy).map_err(|_| Error::AlreadyInitialized)
}

// Workers created before `init` keep the default.
pub fn current() -> ExitPolicy {
    POLICY.get().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_keeps_running() {
        assert_eq!(ExitPolicy::default(), ExitPolicy::keep_running());
        assert!(!ExitPolicy::default().exit_on_error);
    }

    #[test]
    fn test_init_only_once() {
        // The only test in the crate that touches the global.
        assert!(init(ExitPolicy::keep_running()).is_ok());
        assert!(matches!(init(ExitPolicy::exit_on_error()), Err(Error::AlreadyInitialized)));
        assert_eq!(current(), ExitPolicy::keep_running());
    }
}
