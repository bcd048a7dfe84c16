use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration
};

use cl_log::{level::Level, write_options::WriteOptions, Logger};
use cl_worker::{ExitPolicy, WakeSignal, WorkLoop, Worker, WorkerContext};
use log::info;

static DEFAULT_RUN_MS: u64 = 1000;
static IDLE_WAIT: Duration = Duration::from_millis(10);

// Counts iterations, sleeping on its wake signal between them.
struct Counter {
    iterations: AtomicU64,
    signal: WakeSignal,
}

impl Counter {
    fn new() -> Self {
        Self { iterations: AtomicU64::new(0), signal: WakeSignal::new() }
    }
}

impl WorkLoop for Counter {
    fn work_loop(&self, ctx: &WorkerContext) {
        while !ctx.should_stop() {
            self.iterations.fetch_add(1, Ordering::Relaxed);
            self.signal.wait_timeout(IDLE_WAIT);
        }
    }

    fn on_stop(&self) { self.signal.kick() }
}

fn main() -> cl_worker::Result<()> {

    let opt = Some(WriteOptions::EXPANDED);
    let err_opt = Some(WriteOptions::ALL);

    match Logger::builder()
        .with_stderr(Level::Error, err_opt)
        .with_stdout(Level::Warn, opt)
        .with_stdout(Level::Info, opt)
    .build() {
        Ok(_) => {},
        Err(err) => {
            eprintln!("Failed to initialize logger: {}", err);
            std::process::exit(1);
        }
    }

    cl_worker::policy::init(ExitPolicy::exit_on_error())?;

    let run_for = Duration::from_millis(
        std::env::args()
            .nth(1)
            .and_then(|arg| arg.parse().ok())
            .unwrap_or(DEFAULT_RUN_MS)
    );

    let workers: Vec<Worker<Counter>> = (0..num_cpus::get())
        .map(|index| Worker::indexed("counter", index, Counter::new()))
        .collect();

    for worker in &workers { worker.start_working()? }

    info!("Running {} workers for {:?}", workers.len(), run_for);
    std::thread::sleep(run_for);

    for worker in &workers {
        worker.stop_working()?;
        info!(
            "{}: {} iterations",
            worker.name(),
            worker.work().iterations.load(Ordering::Relaxed)
        );
    }

    Ok(())
}
