#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use fixed_pool::report::{end_line, start_line};
use fixed_pool::{InterruptedWait, Reporter};
use parking_lot::Mutex;

/// One observed signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started { worker: String, label: String },
    Finished { worker: String },
    Interrupted { worker: String, label: String },
}

/// Reporter that records every signal and the peak number of tasks
/// between start and end.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Events rendered the way the stdout reporter prints them.
    pub fn lines(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| match e {
                Event::Started { worker, label } => Some(start_line(worker, label)),
                Event::Finished { worker } => Some(end_line(worker)),
                Event::Interrupted { .. } => None,
            })
            .collect()
    }

    pub fn started_labels(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started { label, .. } => Some(label),
                _ => None,
            })
            .collect()
    }

    pub fn count_started(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Started { .. }))
            .count()
    }

    pub fn count_finished(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Finished { .. }))
            .count()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Per worker, signals must alternate Started / Finished and end on Finished.
    pub fn assert_paired(&self) {
        let mut open: HashMap<String, bool> = HashMap::new();
        for event in self.events() {
            match event {
                Event::Started { worker, label } => {
                    let was_open = open.insert(worker.clone(), true).unwrap_or(false);
                    assert!(!was_open, "{} started {} before finishing", worker, label);
                }
                Event::Finished { worker } => {
                    let was_open = open.insert(worker.clone(), false).unwrap_or(false);
                    assert!(was_open, "{} finished without starting", worker);
                }
                Event::Interrupted { worker, .. } => {
                    assert_eq!(open.get(&worker), Some(&true), "{} interrupted while idle", worker);
                }
            }
        }
        assert!(open.values().all(|o| !o), "unfinished tasks: {:?}", open);
    }

    /// Poll until `n` tasks have started or the timeout expires.
    pub fn wait_for_started(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.count_started() >= n {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

impl Reporter for RecordingReporter {
    fn started(&self, worker: &str, label: &str) {
        let running = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        self.events.lock().push(Event::Started {
            worker: worker.to_string(),
            label: label.to_string(),
        });
    }

    fn finished(&self, worker: &str) {
        self.events.lock().push(Event::Finished {
            worker: worker.to_string(),
        });
        self.running.fetch_sub(1, Ordering::SeqCst);
    }

    fn interrupted(&self, worker: &str, label: &str, _err: &InterruptedWait) {
        self.events.lock().push(Event::Interrupted {
            worker: worker.to_string(),
            label: label.to_string(),
        });
    }
}
