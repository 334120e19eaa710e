use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;

use crate::pool::Shared;
use crate::InterruptedWait;

/// Execution context handed to every job: the identity of the worker running
/// it and the interruptible pause.
pub struct WorkerContext {
    id: usize,
    name: String,
    interrupts: Receiver<()>,
    interrupted: Cell<bool>,
    shared: Arc<Shared>,
}

impl WorkerContext {
    /// 1-based worker id, stable for the lifetime of the pool.
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block for `duration`, or until the worker is interrupted.
    ///
    /// An interruption consumes the pending signal and returns
    /// [`InterruptedWait`] carrying how long the pause actually lasted.
    pub fn pause(&self, duration: Duration) -> Result<(), InterruptedWait> {
        let start = Instant::now();
        match self.interrupts.recv_timeout(duration) {
            Ok(()) => {
                self.interrupted.set(true);
                Err(InterruptedWait {
                    worker: self.name.clone(),
                    elapsed: start.elapsed(),
                })
            }
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Err(RecvTimeoutError::Disconnected) => {
                // interrupt handle is gone, nobody can wake us any more
                thread::sleep(duration.saturating_sub(start.elapsed()));
                Ok(())
            }
        }
    }

    /// Drop interruptions aimed at a task that already finished.
    fn clear_interrupts(&self) {
        while self.interrupts.try_recv().is_ok() {}
        self.interrupted.set(false);
    }
}

impl fmt::Debug for WorkerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerContext")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Pool side handle of one worker thread
pub(crate) struct Worker {
    id: usize,
    name: String,
    interrupt: Sender<()>,
    thread_id: ThreadId,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Worker {
    /// Spawn a named worker thread pulling tasks from the shared queue
    pub(crate) fn spawn(
        id: usize,
        name: String,
        shared: Arc<Shared>,
        stack_size: Option<usize>,
    ) -> io::Result<Worker> {
        let (interrupt, interrupts) = bounded(1);
        let ctx = WorkerContext {
            id,
            name: name.clone(),
            interrupts,
            interrupted: Cell::new(false),
            shared: Arc::clone(&shared),
        };

        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(size) = stack_size {
            builder = builder.stack_size(size);
        }

        shared.counters.live_workers.fetch_add(1, Ordering::SeqCst);
        let thread = match builder.spawn(move || run(ctx)) {
            Ok(thread) => thread,
            Err(e) => {
                shared.counters.live_workers.fetch_sub(1, Ordering::SeqCst);
                return Err(e);
            }
        };

        Ok(Worker {
            id,
            name,
            interrupt,
            thread_id: thread.thread().id(),
            thread: Mutex::new(Some(thread)),
        })
    }

    pub(crate) fn id(&self) -> usize {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Whether the caller is running on this worker's thread.
    pub(crate) fn is_current(&self) -> bool {
        self.thread_id == thread::current().id()
    }

    /// Deliver one interruption. A second one while the first is still
    /// pending is coalesced.
    pub(crate) fn interrupt(&self) -> bool {
        match self.interrupt.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        }
    }

    /// Join the thread once. Later calls return immediately.
    pub(crate) fn join(&self) {
        let handle = self.thread.lock().take();
        if let Some(handle) = handle {
            if self.is_current() {
                log::warn!("{} cannot join itself, detaching", self.name);
                return;
            }
            if handle.join().is_err() {
                log::error!("{} terminated abnormally", self.name);
            }
        }
    }
}

impl fmt::Debug for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

fn run(ctx: WorkerContext) {
    log::debug!("{} started", ctx.name);

    while let Ok(task) = ctx.shared.queue().recv() {
        ctx.clear_interrupts();
        let (label, job) = task.into_parts();
        let counters = &ctx.shared.counters;

        counters.task_started();
        log::debug!("{} executing `{}`", ctx.name, label);
        let start = Instant::now();

        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| job(&ctx))) {
            counters.panicked.fetch_add(1, Ordering::SeqCst);
            log::error!(
                "{} panicked while running `{}`: {}",
                ctx.name,
                label,
                panic_message(payload.as_ref())
            );
        }

        if ctx.interrupted.get() {
            counters.interrupted.fetch_add(1, Ordering::SeqCst);
        }
        counters.task_finished();
        log::debug!("{} finished `{}` in {:?}", ctx.name, label, start.elapsed());
    }

    log::debug!("{} exiting, queue closed", ctx.name);
    ctx.shared.worker_exited();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "-"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");
        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "-");
    }
}
