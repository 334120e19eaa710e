//! 任务执行信号（开始/结束/中断）的输出

use std::backtrace::Backtrace;
use std::io::{self, Write};

use parking_lot::Mutex;

use crate::InterruptedWait;

/// `<worker> Start. Task = <label>`
pub fn start_line(worker: &str, label: &str) -> String {
    format!("{} Start. Task = {}", worker, label)
}

/// `<worker> End.`
pub fn end_line(worker: &str) -> String {
    format!("{} End.", worker)
}

/// 中断诊断信息，总是附带调用栈
pub fn interruption_trace(worker: &str, label: &str, err: &InterruptedWait) -> String {
    format!(
        "{} interrupted while running `{}`: {}\n{}",
        worker,
        label,
        err,
        Backtrace::force_capture()
    )
}

/// Receives the observable signals of a task's execution.
pub trait Reporter: Send + Sync {
    fn started(&self, worker: &str, label: &str);

    fn finished(&self, worker: &str);

    /// The simulated work was cut short. Logged with a backtrace by default.
    fn interrupted(&self, worker: &str, label: &str, err: &InterruptedWait) {
        log::error!("{}", interruption_trace(worker, label, err));
    }
}

fn write_line<W: Write>(out: &mut W, line: &str) {
    if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
        log::warn!("failed to write `{}`: {}", line, e);
    }
}

/// Writes start/end lines to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn started(&self, worker: &str, label: &str) {
        write_line(&mut io::stdout().lock(), &start_line(worker, label));
    }

    fn finished(&self, worker: &str) {
        write_line(&mut io::stdout().lock(), &end_line(worker));
    }
}

/// Writes start/end lines to any writer, one line per signal.
#[derive(Debug, Default)]
pub struct WriterReporter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> WriterReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write + Send> Reporter for WriterReporter<W> {
    fn started(&self, worker: &str, label: &str) {
        write_line(&mut *self.out.lock(), &start_line(worker, label));
    }

    fn finished(&self, worker: &str) {
        write_line(&mut *self.out.lock(), &end_line(worker));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_line_format() {
        assert_eq!(
            start_line("pool-thread-3", "Task 0"),
            "pool-thread-3 Start. Task = Task 0"
        );
        assert_eq!(end_line("pool-thread-3"), "pool-thread-3 End.");
    }

    #[test]
    fn test_writer_reporter_lines() {
        let reporter = WriterReporter::new(Vec::new());
        reporter.started("pool-thread-1", "Task 4");
        reporter.finished("pool-thread-1");

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, "pool-thread-1 Start. Task = Task 4\npool-thread-1 End.\n");
    }

    #[test]
    fn test_interruption_trace_has_backtrace() {
        let err = InterruptedWait {
            worker: "pool-thread-2".into(),
            elapsed: Duration::from_millis(3),
        };
        let trace = interruption_trace("pool-thread-2", "Task 1", &err);
        assert!(trace.starts_with("pool-thread-2 interrupted while running `Task 1`"));
        assert!(!trace.contains("disabled backtrace"), "{}", trace);
    }
}
