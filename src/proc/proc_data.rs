use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result;
use std::mem;
use std::rc::Rc;

use crate::consts::CAP_PROC_MAILBOX;
use crate::consts::CAP_PROC_STACK;
use crate::core::Callback;
use crate::core::Cancel;
use crate::core::Pid;
use crate::core::Task;
use crate::core::Term;

/// Shared handle to a process owned by the scheduler.
pub(crate) type ProcHandle = Rc<RefCell<ProcData>>;

// -----------------------------------------------------------------------------
// Frame
// -----------------------------------------------------------------------------

/// A continuation frame pushed by [`Task::AndThen`] or [`Task::OnError`].
pub(crate) enum Frame {
  AndThen(Callback),
  OnError(Callback),
}

// -----------------------------------------------------------------------------
// Root
// -----------------------------------------------------------------------------

/// The current root of a process.
pub(crate) enum Root {
  /// Runnable, or parked on a [`Task::Receive`] with an empty mailbox.
  Ready(Task),
  /// Taken by the stepper for the duration of one transition.
  Stepping,
  /// Blocked on a started binding.
  Awaiting { binding: u64, cancel: Option<Cancel> },
  /// Killed or exited.
  Dead,
}

impl Root {
  #[inline]
  pub(crate) const fn is_dead(&self) -> bool {
    matches!(self, Self::Dead)
  }
}

impl Debug for Root {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Ready(task) => f.debug_tuple("Ready").field(task).finish(),
      Self::Stepping => f.write_str("Stepping"),
      Self::Awaiting { binding, .. } => f.debug_struct("Awaiting").field("binding", binding).finish(),
      Self::Dead => f.write_str("Dead"),
    }
  }
}

// -----------------------------------------------------------------------------
// Proc Data
// -----------------------------------------------------------------------------

/// Execution context of one process.
///
/// Mutated only by the scheduler: the stepper, `send`, `kill`, and binding
/// completion.
pub(crate) struct ProcData {
  pub(crate) pid: Pid,
  pub(crate) label: Option<&'static str>,
  pub(crate) root: Root,
  pub(crate) stack: Vec<Frame>,
  pub(crate) mailbox: VecDeque<Term>,
  pub(crate) binding: u64,
  pub(crate) queued: bool,
}

impl ProcData {
  pub(crate) fn new(pid: Pid, label: Option<&'static str>, task: Task) -> Self {
    Self {
      pid,
      label,
      root: Root::Ready(task),
      stack: Vec::with_capacity(CAP_PROC_STACK),
      mailbox: VecDeque::with_capacity(CAP_PROC_MAILBOX),
      binding: 0,
      queued: false,
    }
  }

  #[inline]
  pub(crate) fn into_handle(self) -> ProcHandle {
    Rc::new(RefCell::new(self))
  }

  #[inline]
  pub(crate) const fn is_dead(&self) -> bool {
    self.root.is_dead()
  }

  /// Pops frames until an [`Frame::AndThen`] is found, discarding error
  /// handlers on the way.
  pub(crate) fn unwind_success(&mut self) -> Option<Callback> {
    while let Some(frame) = self.stack.pop() {
      if let Frame::AndThen(callback) = frame {
        return Some(callback);
      }
    }

    None
  }

  /// Pops frames until an [`Frame::OnError`] is found, discarding success
  /// continuations on the way.
  pub(crate) fn unwind_failure(&mut self) -> Option<Callback> {
    while let Some(frame) = self.stack.pop() {
      if let Frame::OnError(callback) = frame {
        return Some(callback);
      }
    }

    None
  }

  /// Marks the process dead, returning the cancel thunk of a pending
  /// binding.
  pub(crate) fn kill(&mut self) -> Option<Cancel> {
    let root: Root = mem::replace(&mut self.root, Root::Dead);

    self.stack.clear();
    self.mailbox.clear();

    match root {
      Root::Awaiting { cancel, .. } => cancel,
      Root::Ready(_) | Root::Stepping | Root::Dead => None,
    }
  }
}

impl Debug for ProcData {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_struct("ProcData")
      .field("pid", &self.pid)
      .field("label", &self.label)
      .field("root", &self.root)
      .field("stack", &self.stack.len())
      .field("mailbox", &self.mailbox)
      .field("queued", &self.queued)
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::cell::Cell;
  use std::num::NonZeroU64;
  use std::rc::Rc;

  use crate::core::Callback;
  use crate::core::Cancel;
  use crate::core::Pid;
  use crate::core::Task;
  use crate::core::Term;
  use crate::proc::Frame;
  use crate::proc::ProcData;
  use crate::proc::Root;

  fn data() -> ProcData {
    ProcData::new(Pid::new(NonZeroU64::MIN), None, Task::succeed(()))
  }

  fn tagged(tag: u8) -> Callback {
    Callback::new(move |_: Term| Task::succeed(tag))
  }

  fn tag_of(callback: Callback) -> u8 {
    match callback.call(Term::unit()) {
      Task::Succeed(value) => value.coerce::<u8>(),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn test_unwind_success_skips_error_handlers() {
    let mut data: ProcData = data();

    data.stack.push(Frame::AndThen(tagged(1)));
    data.stack.push(Frame::OnError(tagged(2)));
    data.stack.push(Frame::OnError(tagged(3)));

    assert_eq!(data.unwind_success().map(tag_of), Some(1));
    assert!(data.stack.is_empty());
  }

  #[test]
  fn test_unwind_failure_skips_continuations() {
    let mut data: ProcData = data();

    data.stack.push(Frame::OnError(tagged(1)));
    data.stack.push(Frame::AndThen(tagged(2)));

    assert_eq!(data.unwind_failure().map(tag_of), Some(1));
    assert!(data.unwind_failure().is_none());
  }

  #[test]
  fn test_kill_returns_pending_cancel() {
    let fired: Rc<Cell<bool>> = Rc::new(Cell::new(false));
    let flag: Rc<Cell<bool>> = Rc::clone(&fired);
    let mut data: ProcData = data();

    data.root = Root::Awaiting {
      binding: 1,
      cancel: Some(Cancel::new(move || flag.set(true))),
    };
    data.mailbox.push_back(Term::unit());

    let cancel: Option<Cancel> = data.kill();

    assert!(data.is_dead());
    assert!(data.mailbox.is_empty());
    assert!(!fired.get());

    cancel.unwrap().cancel();

    assert!(fired.get());
  }

  #[test]
  fn test_kill_ready_has_no_cancel() {
    assert!(data().kill().is_none());
  }
}
