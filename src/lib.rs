use thiserror::Error;

#[macro_use]
pub (crate) mod logging;

pub mod policy;
pub mod worker;

pub use policy::ExitPolicy;
pub use worker::{
    WakeSignal,
    WorkLoop,
    Worker,
    WorkerContext,
    WorkerError,
    WorkerStartError,
    WorkerState,
    WorkerStopError
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Exit policy already initialized")]
    AlreadyInitialized,
}

impl From<WorkerStartError> for Error {
    fn from(error: WorkerStartError) -> Self { Error::Worker(error.into()) }
}

impl From<WorkerStopError> for Error {
    fn from(error: WorkerStopError) -> Self { Error::Worker(error.into()) }
}

pub type Result<T> = std::result::Result<T, Error>;
