use std::time::Duration;

use crate::core::Cancel;
use crate::core::Complete;
use crate::core::Item;
use crate::core::Pid;
use crate::core::Task;
use crate::core::Term;
use crate::erts::Runtime;

// -----------------------------------------------------------------------------
// Process
// -----------------------------------------------------------------------------

/// Process operations expressed as tasks.
///
/// Each operation runs against the runtime of the process that reaches it,
/// so they compose with [`Task::and_then`] and [`Task::on_error`] like any
/// other task.
pub struct Process;

impl Process {
  /// Spawns `task` as a new process and succeeds with its [`Pid`].
  pub fn spawn(task: Task) -> Task {
    with_runtime(move |runtime: Runtime, complete: Complete| {
      let pid: Pid = runtime.raw_spawn(task);
      complete.succeed(pid);
    })
  }

  /// Kills the process `pid` and succeeds with `()`.
  ///
  /// Killing the calling process stops it before the continuation runs.
  pub fn kill(pid: Pid) -> Task {
    with_runtime(move |runtime: Runtime, complete: Complete| {
      runtime.kill(pid);
      complete.succeed(());
    })
  }

  /// Sends `message` to `pid` and succeeds with `()`.
  pub fn send<T>(pid: Pid, message: T) -> Task
  where
    T: Item,
  {
    Self::send_term(pid, Term::new(message))
  }

  /// Sends an already-erased `message` to `pid`.
  pub fn send_term(pid: Pid, message: Term) -> Task {
    with_runtime(move |runtime: Runtime, complete: Complete| {
      runtime.raw_send(pid, message);
      complete.succeed(());
    })
  }

  /// Succeeds with the [`Pid`] of the calling process.
  pub fn this() -> Task {
    Task::native(|complete: Complete| {
      let pid: Pid = complete.pid();
      complete.succeed(pid);
      None
    })
  }

  /// Succeeds with `()` once `duration` has elapsed on the host clock.
  ///
  /// The host timer is cancelled if the sleeping process is killed.
  pub fn sleep(duration: Duration) -> Task {
    Task::native(move |complete: Complete| {
      let runtime: Runtime = complete.runtime()?;
      let cancel: Cancel = runtime.host().delay(
        duration,
        Box::new(move || complete.succeed(())),
      );

      Some(cancel)
    })
  }
}

#[inline]
fn with_runtime<F>(f: F) -> Task
where
  F: FnOnce(Runtime, Complete) + 'static,
{
  Task::native(move |complete: Complete| {
    if let Some(runtime) = complete.runtime() {
      f(runtime, complete);
    }

    None
  })
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
