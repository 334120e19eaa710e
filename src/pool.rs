//! 固定大小的工作线程池
//!
//! 创建时一次性启动全部worker，所有worker从同一个无界FIFO通道取任务。
//! 关闭时丢弃发送端：worker处理完队列中剩余的任务后观察到断开并退出。

use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, SendError, Sender};
use log::{debug, error, info, warn};
use parking_lot::{Condvar, Mutex};

use crate::config::PoolConfig;
use crate::state::PoolState;
use crate::stats::{Counters, PoolStats};
use crate::task::Task;
use crate::worker::Worker;
use crate::{PoolError, Result};

/// 提交闸门 - 状态与发送端在同一把锁下变更，关闭后不会再有任务入队
struct Gate {
    state: PoolState,
    sender: Option<Sender<Task>>,
}

/// 线程池句柄与所有worker线程共享的状态
pub(crate) struct Shared {
    gate: Mutex<Gate>,
    terminated: Condvar,
    queue: Receiver<Task>,
    pub(crate) counters: Counters,
}

impl Shared {
    fn new() -> Self {
        let (sender, queue) = unbounded();
        Self {
            gate: Mutex::new(Gate {
                state: PoolState::Accepting,
                sender: Some(sender),
            }),
            terminated: Condvar::new(),
            queue,
            counters: Counters::default(),
        }
    }

    pub(crate) fn queue(&self) -> &Receiver<Task> {
        &self.queue
    }

    fn state(&self) -> PoolState {
        self.gate.lock().state
    }

    fn enqueue(&self, task: Task) -> Result<()> {
        let gate = self.gate.lock();
        let sender = match (gate.state, gate.sender.as_ref()) {
            (PoolState::Accepting, Some(sender)) => sender,
            (state, _) => {
                warn!("rejected task `{}`: pool is {}", task.label(), state);
                return Err(PoolError::Rejected {
                    label: task.label().to_string(),
                    state,
                });
            }
        };

        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        if let Err(SendError(task)) = sender.send(task) {
            self.counters.submitted.fetch_sub(1, Ordering::SeqCst);
            error!("queue disconnected, dropping task `{}`", task.label());
            return Err(PoolError::Rejected {
                label: task.label().to_string(),
                state: gate.state,
            });
        }
        Ok(())
    }

    /// Accepting -> Draining，已经关闭过则返回false
    fn close(&self) -> bool {
        let mut gate = self.gate.lock();
        if !gate.state.advance(PoolState::Draining) {
            return false;
        }
        // dropping the only sender lets workers see the disconnect once the queue is empty
        gate.sender = None;
        info!("pool draining, {} task(s) still queued", self.queue.len());

        if self.counters.live_workers.load(Ordering::SeqCst) == 0 {
            gate.state.advance(PoolState::Terminated);
            self.terminated.notify_all();
        }
        true
    }

    /// 每个worker线程退出前调用
    pub(crate) fn worker_exited(&self) {
        if self.counters.live_workers.fetch_sub(1, Ordering::SeqCst) != 1 {
            return;
        }
        let mut gate = self.gate.lock();
        if gate.state.advance(PoolState::Terminated) {
            info!("pool terminated");
            self.terminated.notify_all();
        }
    }

    fn wait_terminated(&self) {
        let mut gate = self.gate.lock();
        while !gate.state.is_terminated() {
            self.terminated.wait(&mut gate);
        }
    }
}

/// A fixed set of worker threads sharing one FIFO task queue.
///
/// Dropping the pool shuts it down and waits for every queued task.
pub struct WorkerPool {
    config: PoolConfig,
    shared: Arc<Shared>,
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Create a pool with `capacity` workers and default settings.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_config(PoolConfig::new(capacity)?)
    }

    /// Create a pool and spawn all of its workers.
    ///
    /// If any worker fails to spawn, the ones already running are shut down
    /// and joined before the error is returned.
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let shared = Arc::new(Shared::new());
        let mut workers = Vec::with_capacity(config.capacity());

        for id in 1..=config.capacity() {
            let name = config.worker_name(id);
            match Worker::spawn(id, name, Arc::clone(&shared), config.stack_size()) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    error!("failed to spawn {}: {}", config.worker_name(id), e);
                    shared.close();
                    for worker in &workers {
                        worker.join();
                    }
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        info!("worker pool started with {} worker(s)", workers.len());
        Ok(Self {
            config,
            shared,
            workers,
        })
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn state(&self) -> PoolState {
        self.shared.state()
    }

    /// Names of all workers, ordered by id.
    pub fn worker_names(&self) -> Vec<String> {
        self.workers.iter().map(|w| w.name().to_string()).collect()
    }

    /// Queue a task. Never blocks on worker availability.
    ///
    /// Once shutdown has been requested the task is dropped without running
    /// and [`PoolError::Rejected`] is returned.
    pub fn submit(&self, task: Task) -> Result<()> {
        debug!("submitting `{}`", task.label());
        self.shared.enqueue(task)
    }

    /// Stop accepting tasks. Queued and running tasks still complete.
    /// Does not block; calling it again has no effect.
    pub fn shutdown(&self) {
        if self.shared.close() {
            debug!("shutdown requested");
        }
    }

    /// Shut down, then block until every worker has exited.
    ///
    /// Called from a task running on one of this pool's own workers (this
    /// includes dropping the last handle there), it only shuts down and
    /// returns: that worker cannot exit while it is still inside the call,
    /// so waiting would never finish. The remaining workers drain the queue
    /// and exit on their own.
    pub fn join(&self) {
        self.shutdown();
        if let Some(worker) = self.workers.iter().find(|w| w.is_current()) {
            debug!("join called from {}, not waiting for termination", worker.name());
            return;
        }
        for worker in &self.workers {
            worker.join();
        }
        self.shared.wait_terminated();
    }

    /// Interrupt the worker with the given 1-based id.
    ///
    /// The interruption ends that worker's current (or next)
    /// [`pause`](crate::WorkerContext::pause) early. Pending interruptions are
    /// cleared before a worker starts each task.
    pub fn interrupt(&self, worker_id: usize) -> Result<()> {
        let worker = self
            .workers
            .iter()
            .find(|w| w.id() == worker_id)
            .ok_or(PoolError::UnknownWorker(worker_id))?;
        if !worker.interrupt() {
            debug!("{} already exited, interrupt ignored", worker.name());
        }
        Ok(())
    }

    /// Interrupt every worker.
    pub fn interrupt_all(&self) {
        for worker in &self.workers {
            worker.interrupt();
        }
    }

    pub fn stats(&self) -> PoolStats {
        self.shared
            .counters
            .snapshot(self.state(), self.capacity(), self.shared.queue.len())
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("workers", &self.workers)
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join();
    }
}
