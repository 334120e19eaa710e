//! The simulated-work task and the driver the binary runs.

use std::sync::Arc;
use std::time::Duration;

use crate::pool::WorkerPool;
use crate::report::Reporter;
use crate::task::Task;
use crate::Result;

/// How long each simulated task pauses.
pub const WORK_DURATION: Duration = Duration::from_millis(2000);
/// Worker count used by the binary.
pub const DEMO_CAPACITY: usize = 5;
/// Number of tasks the binary submits.
pub const DEMO_TASKS: usize = 10;

pub fn task_label(index: usize) -> String {
    format!("Task {}", index)
}

/// Report start, pause for `work`, report end.
///
/// An interrupted pause is reported and the task still ends normally.
pub fn simulated_task(label: String, work: Duration, reporter: Arc<dyn Reporter>) -> Task {
    Task::new(label.clone(), move |ctx| {
        reporter.started(ctx.name(), &label);
        if let Err(e) = ctx.pause(work) {
            reporter.interrupted(ctx.name(), &label, &e);
        }
        reporter.finished(ctx.name());
    })
}

/// Create a pool of `capacity` workers, submit `tasks` simulated tasks
/// labelled `Task 0..` in order, and request shutdown.
///
/// The returned pool is draining; joining or dropping it waits for the work.
pub fn run(
    capacity: usize,
    tasks: usize,
    work: Duration,
    reporter: Arc<dyn Reporter>,
) -> Result<WorkerPool> {
    let pool = WorkerPool::new(capacity)?;
    for i in 0..tasks {
        pool.submit(simulated_task(task_label(i), work, Arc::clone(&reporter)))?;
    }
    pool.shutdown();
    Ok(pool)
}
