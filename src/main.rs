use std::sync::Arc;

use fixed_pool::demo::{self, DEMO_CAPACITY, DEMO_TASKS, WORK_DURATION};
use fixed_pool::StdoutReporter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let pool = demo::run(DEMO_CAPACITY, DEMO_TASKS, WORK_DURATION, Arc::new(StdoutReporter))?;

    // workers keep the process alive until the queue has drained
    pool.join();
    log::info!("done: {:?}", pool.stats());
    Ok(())
}
