use std::fmt;

use crate::worker::WorkerContext;

/// Boxed unit of work run by a worker.
pub type Job = Box<dyn FnOnce(&WorkerContext) + Send + 'static>;

/// A labelled unit of work. Moved into the queue on submit and consumed by
/// exactly one worker.
pub struct Task {
    label: String,
    job: Job,
}

impl Task {
    pub fn new<F>(label: impl Into<String>, job: F) -> Self
    where
        F: FnOnce(&WorkerContext) + Send + 'static,
    {
        Self {
            label: label.into(),
            job: Box::new(job),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn into_parts(self) -> (String, Job) {
        (self.label, self.job)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            // job is an opaque closure
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_debug() {
        let task = Task::new("Task 7", |_| {});
        assert_eq!(task.label(), "Task 7");
        assert_eq!(format!("{:?}", task), "Task { label: \"Task 7\" }");
    }
}
