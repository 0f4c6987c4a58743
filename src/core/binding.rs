use std::cell::RefCell;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result;
use std::rc::Rc;
use std::rc::Weak;

use crate::core::Item;
use crate::core::Pid;
use crate::core::Task;
use crate::erts::Runtime;
use crate::erts::WeakRuntime;
use crate::proc::ProcData;
use crate::proc::ProcHandle;

// -----------------------------------------------------------------------------
// Complete
// -----------------------------------------------------------------------------

/// Single-shot handle that resumes a process suspended on a
/// [`Task::Native`].
///
/// The handle is consumed on use, so a binding can never be completed
/// twice. Completing after the owning process was killed, or after the
/// runtime was dropped, does nothing.
pub struct Complete {
  runtime: WeakRuntime,
  process: Weak<RefCell<ProcData>>,
  binding: u64,
  pid: Pid,
}

impl Complete {
  #[inline]
  pub(crate) fn new(runtime: WeakRuntime, process: &ProcHandle, binding: u64, pid: Pid) -> Self {
    Self {
      runtime,
      process: Rc::downgrade(process),
      binding,
      pid,
    }
  }

  /// Returns the identifier of the suspended process.
  #[inline]
  pub const fn pid(&self) -> Pid {
    self.pid
  }

  /// Returns the runtime that started this binding, if it is still alive.
  #[inline]
  pub fn runtime(&self) -> Option<Runtime> {
    self.runtime.upgrade()
  }

  /// Replaces the suspended root with `task` and reschedules the process.
  pub fn complete(self, task: Task) {
    let Some(runtime) = self.runtime.upgrade() else {
      return;
    };

    let Some(process) = self.process.upgrade() else {
      tracing::trace!(target: "errand", pid = %self.pid, "completion dropped");
      return;
    };

    runtime.resume(&process, self.binding, task);
  }

  /// Resumes the process with a successful `value`.
  #[inline]
  pub fn succeed<T>(self, value: T)
  where
    T: Item,
  {
    self.complete(Task::succeed(value))
  }

  /// Resumes the process with an `error`.
  #[inline]
  pub fn fail<E>(self, error: E)
  where
    E: Item,
  {
    self.complete(Task::fail(error))
  }
}

impl Debug for Complete {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_struct("Complete")
      .field("pid", &self.pid)
      .field("binding", &self.binding)
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Cancel
// -----------------------------------------------------------------------------

/// Cancellation thunk returned by the start function of a binding.
///
/// Invoked at most once, when the owning process is killed while the
/// binding is still pending.
#[repr(transparent)]
pub struct Cancel {
  inner: Box<dyn FnOnce()>,
}

impl Cancel {
  #[inline]
  pub fn new<F>(f: F) -> Self
  where
    F: FnOnce() + 'static,
  {
    Self { inner: Box::new(f) }
  }

  #[inline]
  pub fn cancel(self) {
    (self.inner)()
  }
}

impl Debug for Cancel {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.write_str("Cancel(..)")
  }
}
