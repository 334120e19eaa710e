//! fixed_pool 核心库入口 - 固定大小的工作线程池
//!
//! A [`WorkerPool`] spawns `capacity` named worker threads up front. Tasks are
//! queued in FIFO order on one shared channel and each task runs exactly once
//! on whichever worker dequeues it. [`WorkerPool::shutdown`] stops accepting
//! new work without cancelling anything already queued, and
//! [`WorkerPool::join`] blocks until the queue has drained.
//!
//! ```no_run
//! use fixed_pool::{Task, WorkerPool};
//! use std::time::Duration;
//!
//! let pool = WorkerPool::new(4).unwrap();
//! for i in 0..8 {
//!     pool.submit(Task::new(format!("Task {}", i), |ctx| {
//!         if let Err(e) = ctx.pause(Duration::from_millis(100)) {
//!             log::warn!("{}", e);
//!         }
//!     }))
//!     .unwrap();
//! }
//! pool.join();
//! ```

pub mod config;
pub mod demo;
pub mod pool;
pub mod report;
pub mod state;
pub mod stats;
pub mod task;
mod worker;

use std::time::Duration;

use crate::state::PoolState;

/// 线程池错误类型
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    #[error("pool capacity must be at least 1, got {0}")]
    InvalidCapacity(usize),

    #[error("task `{label}` rejected: pool is {state}")]
    Rejected { label: String, state: PoolState },

    #[error("no worker with id {0}")]
    UnknownWorker(usize),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// 模拟工作的暂停被中断，提前结束
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{worker} interrupted after {elapsed:?}")]
pub struct InterruptedWait {
    pub worker: String,
    pub elapsed: Duration,
}

pub type Result<T> = std::result::Result<T, PoolError>;

pub use config::PoolConfig;
pub use pool::WorkerPool;
pub use report::{Reporter, StdoutReporter, WriterReporter};
pub use stats::PoolStats;
pub use task::Task;
pub use worker::WorkerContext;
