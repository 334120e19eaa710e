//! 线程池配置

use crate::{PoolError, Result};

/// Prefix used for worker thread names when none is configured.
pub const DEFAULT_NAME_PREFIX: &str = "pool-thread";

/// Settings a [`WorkerPool`](crate::WorkerPool) is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    capacity: usize,
    name_prefix: String,
    stack_size: Option<usize>,
}

impl PoolConfig {
    /// 创建配置，capacity必须 >= 1
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity(capacity));
        }
        Ok(Self {
            capacity,
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            stack_size: None,
        })
    }

    /// Worker threads are named `<prefix>-<id>`.
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Stack size in bytes for each worker thread. `None` keeps the platform default.
    pub fn with_stack_size(mut self, stack_size: Option<usize>) -> Self {
        self.stack_size = stack_size;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    pub fn stack_size(&self) -> Option<usize> {
        self.stack_size
    }

    /// Name of the worker with the given 1-based id.
    pub fn worker_name(&self, id: usize) -> String {
        format!("{}-{}", self.name_prefix, id)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(PoolError::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    /// One worker per logical CPU.
    fn default() -> Self {
        Self {
            capacity: num_cpus::get().max(1),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            stack_size: None,
        }
    }
}
