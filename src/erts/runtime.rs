use hashbrown::HashMap;
use std::cell::Cell;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::num::NonZeroU32;
use std::num::NonZeroU64;
use std::rc::Rc;
use std::rc::Weak;
use std::time::Duration;

use crate::consts;
use crate::core::Cancel;
use crate::core::Pid;
use crate::core::Task;
use crate::core::Term;
use crate::erts::Host;
use crate::proc::ProcData;
use crate::proc::ProcHandle;
use crate::raise;

// -----------------------------------------------------------------------------
// Runtime
// -----------------------------------------------------------------------------

/// Handle to a single-threaded task runtime.
///
/// Cloning the handle is cheap; every clone refers to the same process table
/// and work queue. The runtime only makes progress when its [`Host`] runs
/// the ticks it has deferred.
#[derive(Clone)]
#[repr(transparent)]
pub struct Runtime {
  pub(crate) inner: Rc<RuntimeInner>,
}

pub(crate) struct RuntimeInner {
  pub(crate) config: RuntimeConfig,
  pub(crate) host: Box<dyn Host>,
  pub(crate) procs: RefCell<HashMap<Pid, ProcHandle>>,
  pub(crate) queue: RefCell<VecDeque<ProcHandle>>,
  pub(crate) armed: Cell<bool>,
  pub(crate) ticks: Cell<u64>,
  next_pid: Cell<u64>,
}

impl Runtime {
  /// Creates a new runtime driven by `host`.
  pub fn new<H>(config: RuntimeConfig, host: H) -> Self
  where
    H: Host + 'static,
  {
    tracing::debug!(
      target: "errand",
      step_budget = config.step_budget.get(),
      "runtime created",
    );

    Self {
      inner: Rc::new(RuntimeInner {
        config,
        host: Box::new(host),
        procs: RefCell::new(HashMap::with_capacity(consts::CAP_REGISTERED_PROCS)),
        queue: RefCell::new(VecDeque::with_capacity(consts::CAP_WORK_QUEUE)),
        armed: Cell::new(false),
        ticks: Cell::new(0),
        next_pid: Cell::new(1),
      }),
    }
  }

  /// Returns the runtime configuration.
  #[inline]
  pub fn config(&self) -> &RuntimeConfig {
    &self.inner.config
  }

  /// Returns the host driving this runtime.
  #[inline]
  pub fn host(&self) -> &dyn Host {
    &*self.inner.host
  }

  #[inline]
  pub(crate) fn downgrade(&self) -> WeakRuntime {
    WeakRuntime {
      inner: Rc::downgrade(&self.inner),
    }
  }

  // ---------------------------------------------------------------------------
  // Process API
  // ---------------------------------------------------------------------------

  /// Spawns a new process running `task` and schedules it.
  #[inline]
  pub fn raw_spawn(&self, task: Task) -> Pid {
    self.raw_spawn_with(|_| task)
  }

  /// Spawns a new process whose task is built from its own pid.
  pub fn raw_spawn_with<F>(&self, f: F) -> Pid
  where
    F: FnOnce(Pid) -> Task,
  {
    let pid: Pid = self.alloc_pid();
    self.raw_spawn_as(pid, None, f(pid));
    pid
  }

  /// Pushes `message` onto the mailbox of `pid` and schedules it.
  ///
  /// Messages sent to a dead or unknown process are dropped.
  pub fn raw_send(&self, pid: Pid, message: Term) {
    let proc: Option<ProcHandle> = self.inner.procs.borrow().get(&pid).cloned();

    let Some(proc) = proc else {
      tracing::trace!(target: "errand", %pid, ?message, "message dropped");
      return;
    };

    let runnable: bool = {
      let mut data = proc.borrow_mut();
      data.mailbox.push_back(message);
      !data.is_dead()
    };

    if runnable {
      self.enqueue(&proc);
    }
  }

  /// Kills the process `pid`.
  ///
  /// Invokes the cancel thunk of a pending binding, if any, and removes the
  /// process from the table. Killing a dead or unknown process does nothing.
  pub fn kill(&self, pid: Pid) {
    let proc: Option<ProcHandle> = self.inner.procs.borrow_mut().remove(&pid);

    let Some(proc) = proc else {
      return;
    };

    let cancel: Option<Cancel> = proc.borrow_mut().kill();

    tracing::debug!(target: "errand", %pid, cancel = cancel.is_some(), "process killed");

    if let Some(cancel) = cancel {
      cancel.cancel();
    }
  }

  /// Returns `true` if `pid` refers to a live process.
  #[inline]
  pub fn alive(&self, pid: Pid) -> bool {
    self.inner.procs.borrow().contains_key(&pid)
  }

  /// Returns the pids of all live processes, in ascending order.
  pub fn processes(&self) -> Vec<Pid> {
    let mut pids: Vec<Pid> = self.inner.procs.borrow().keys().copied().collect();
    pids.sort_unstable();
    pids
  }

  /// Returns `true` if no process is waiting to be stepped.
  #[inline]
  pub fn is_idle(&self) -> bool {
    !self.inner.armed.get() && self.inner.queue.borrow().is_empty()
  }

  // ---------------------------------------------------------------------------
  // Internal Process API
  // ---------------------------------------------------------------------------

  /// Reserves a pid without creating a process.
  pub(crate) fn alloc_pid(&self) -> Pid {
    let bits: u64 = self.inner.next_pid.get();

    let Some(next) = bits.checked_add(1) else {
      raise!(Error, SysCap, "pid space exhausted");
    };

    let Some(bits) = NonZeroU64::new(bits) else {
      raise!(Error, SysInv, "invalid pid counter");
    };

    self.inner.next_pid.set(next);

    Pid::new(bits)
  }

  /// Spawns a process under a previously reserved `pid`.
  pub(crate) fn raw_spawn_as(&self, pid: Pid, label: Option<&'static str>, task: Task) {
    let proc: ProcHandle = ProcData::new(pid, label, task).into_handle();

    if self.inner.procs.borrow_mut().insert(pid, Rc::clone(&proc)).is_some() {
      raise!(Error, SysInv, format!("duplicate pid {pid}"));
    }

    tracing::debug!(target: "errand", %pid, label, "process spawned");

    self.enqueue(&proc);
  }
}

impl Debug for Runtime {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Runtime")
      .field("config", &self.inner.config)
      .field("processes", &self.inner.procs.borrow().len())
      .field("queued", &self.inner.queue.borrow().len())
      .field("armed", &self.inner.armed.get())
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Weak Runtime
// -----------------------------------------------------------------------------

/// Non-owning runtime handle held by deferred ticks and bindings.
#[derive(Clone)]
#[repr(transparent)]
pub(crate) struct WeakRuntime {
  inner: Weak<RuntimeInner>,
}

impl WeakRuntime {
  #[inline]
  pub(crate) fn upgrade(&self) -> Option<Runtime> {
    self.inner.upgrade().map(|inner| Runtime { inner })
  }
}

// -----------------------------------------------------------------------------
// Runtime Config
// -----------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
  // ---------------------------------------------------------------------------
  // Scheduler Configuration
  // ---------------------------------------------------------------------------
  pub step_budget: NonZeroU32,
  // ---------------------------------------------------------------------------
  // Tokio Runtime Configuration
  // ---------------------------------------------------------------------------
  pub rt_event_interval: u32,
  pub rt_global_queue_interval: u32,
  pub rt_max_blocking_threads: usize,
  pub rt_thread_keep_alive: Duration,
  // ---------------------------------------------------------------------------
  // Tracing Subscriber Configuration
  // ---------------------------------------------------------------------------
  pub tracing_source_file: bool,
  pub tracing_source_line: bool,
  pub tracing_source_name: bool,
  pub tracing_verbose: bool,
  pub tracing_very_verbose: bool,
}

impl RuntimeConfig {
  #[inline]
  pub fn new() -> Self {
    Self {
      step_budget: consts::DEFAULT_STEP_BUDGET,
      rt_event_interval: consts::DEFAULT_EVENT_INTERVAL,
      rt_global_queue_interval: consts::DEFAULT_GLOBAL_QUEUE_INTERVAL,
      rt_max_blocking_threads: consts::DEFAULT_MAX_BLOCKING_THREADS,
      rt_thread_keep_alive: consts::DEFAULT_THREAD_KEEP_ALIVE,
      tracing_source_file: false,
      tracing_source_line: false,
      tracing_source_name: false,
      tracing_verbose: true,
      tracing_very_verbose: false,
    }
  }

  /// Sets the number of transitions shared by all processes in one tick.
  #[inline]
  pub const fn with_step_budget(mut self, step_budget: NonZeroU32) -> Self {
    self.step_budget = step_budget;
    self
  }

  #[inline]
  pub const fn tracing_filter(&self) -> tracing::Level {
    if self.tracing_very_verbose {
      tracing::Level::TRACE
    } else if self.tracing_verbose {
      tracing::Level::DEBUG
    } else {
      tracing::Level::INFO
    }
  }
}

impl Default for RuntimeConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::num::NonZeroU32;

  use crate::core::Pid;
  use crate::core::Task;
  use crate::core::Term;
  use crate::erts::ManualHost;
  use crate::erts::Runtime;
  use crate::erts::RuntimeConfig;

  fn runtime() -> (Runtime, ManualHost) {
    let host: ManualHost = ManualHost::new();
    let runtime: Runtime = Runtime::new(RuntimeConfig::new(), host.clone());

    (runtime, host)
  }

  #[test]
  fn test_config_defaults() {
    let config: RuntimeConfig = RuntimeConfig::default();

    assert_eq!(config.step_budget.get(), 10_000);
    assert_eq!(config.tracing_filter(), tracing::Level::DEBUG);
  }

  #[test]
  fn test_config_with_step_budget() {
    let budget: NonZeroU32 = NonZeroU32::new(7).unwrap();
    let config: RuntimeConfig = RuntimeConfig::new().with_step_budget(budget);

    assert_eq!(config.step_budget, budget);
  }

  #[test]
  fn test_spawn_allocates_unique_pids() {
    let (runtime, _host) = runtime();

    let a: Pid = runtime.raw_spawn(Task::succeed(()));
    let b: Pid = runtime.raw_spawn(Task::succeed(()));

    assert_ne!(a, b);
    assert_eq!(runtime.processes(), vec![a, b]);
  }

  #[test]
  fn test_spawn_arms_pump_once() {
    let (runtime, host) = runtime();

    runtime.raw_spawn(Task::succeed(()));
    runtime.raw_spawn(Task::succeed(()));

    assert_eq!(host.pending_ticks(), 1);
    assert!(!runtime.is_idle());
  }

  #[test]
  fn test_completed_process_exits() {
    let (runtime, host) = runtime();
    let pid: Pid = runtime.raw_spawn(Task::succeed(1_u32));

    host.run_until_idle();

    assert!(!runtime.alive(pid));
    assert!(runtime.is_idle());
  }

  #[test]
  fn test_send_to_unknown_pid_is_dropped() {
    let (runtime, host) = runtime();
    let pid: Pid = runtime.raw_spawn(Task::succeed(()));

    host.run_until_idle();
    runtime.raw_send(pid, Term::new("late"));

    assert!(runtime.is_idle());
    assert_eq!(host.pending_ticks(), 0);
  }

  #[test]
  fn test_kill_unknown_pid_is_noop() {
    let (runtime, host) = runtime();
    let pid: Pid = runtime.raw_spawn(Task::succeed(()));

    host.run_until_idle();
    runtime.kill(pid);
    runtime.kill(pid);

    assert!(runtime.processes().is_empty());
  }

  #[test]
  fn test_raw_spawn_with_sees_own_pid() {
    let (runtime, host) = runtime();
    let pid: Pid = runtime.raw_spawn_with(|pid| Task::receive(move |message: Term| {
      assert_eq!(message.coerce::<Pid>(), pid);
      Task::succeed(())
    }));

    runtime.raw_send(pid, Term::new(pid));
    host.run_until_idle();

    assert!(!runtime.alive(pid));
  }
}
