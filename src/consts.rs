use std::num::NonZeroU32;
use std::time::Duration;

// -----------------------------------------------------------------------------
// System - Scheduler Behavior
// -----------------------------------------------------------------------------

/// Number of process transitions performed per pump tick before control is
/// returned to the host.
///
/// The budget is shared by every process stepped during a tick.
pub const DEFAULT_STEP_BUDGET: NonZeroU32 = match NonZeroU32::new(10_000) {
  Some(budget) => budget,
  None => panic!("step budget must be non-zero"),
};

// -----------------------------------------------------------------------------
// System - Tokio Host
// -----------------------------------------------------------------------------

/// Number of scheduler ticks before polling for external events.
pub const DEFAULT_EVENT_INTERVAL: u32 = 61;

/// Number of scheduler ticks before polling the global task queue.
pub const DEFAULT_GLOBAL_QUEUE_INTERVAL: u32 = 31;

/// Limit for additional threads spawned by the tokio runtime.
pub const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;

/// How long to keep threads in the blocking pool alive.
pub const DEFAULT_THREAD_KEEP_ALIVE: Duration = Duration::from_millis(10 * 1000);

// -----------------------------------------------------------------------------
// System - Effect Managers
// -----------------------------------------------------------------------------

/// Home of the built-in task manager.
pub const TASK_MANAGER_HOME: &str = "Task";

// -----------------------------------------------------------------------------
// System - Memory Allocation
// -----------------------------------------------------------------------------

/// Number of pre-allocated slots in a process mailbox.
pub const CAP_PROC_MAILBOX: usize = 8;

/// Number of pre-allocated continuation frames per process.
pub const CAP_PROC_STACK: usize = 8;

/// Number of pre-allocated process table entries.
pub const CAP_REGISTERED_PROCS: usize = 64;

/// Number of pre-allocated work queue slots.
pub const CAP_WORK_QUEUE: usize = 64;

/// Number of pre-allocated manager table entries.
pub const CAP_REGISTERED_MANAGERS: usize = 8;
