//! Basic example of fixed_pool usage

use fixed_pool::{PoolConfig, Task, WorkerPool};
use std::time::Duration;

fn main() {
    env_logger::try_init().ok();

    // Create a thread pool with 4 workers
    let config = PoolConfig::new(4).unwrap().with_name_prefix("worker");
    let pool = WorkerPool::with_config(config).unwrap();

    // Execute some tasks
    for i in 0..10 {
        pool.submit(Task::new(format!("Task {}", i), move |ctx| {
            println!("{} started task {}", ctx.name(), i);
            if let Err(e) = ctx.pause(Duration::from_millis(100)) {
                eprintln!("{}", e);
            }
            println!("{} completed task {}", ctx.name(), i);
        }))
        .unwrap();
    }

    // Stop accepting work and wait for the queue to drain
    pool.join();
    println!("{:?}", pool.stats());
}
