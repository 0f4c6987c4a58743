use std::mem;

use crate::core::Callback;
use crate::core::Task;
use crate::core::Term;
use crate::erts::Runtime;
use crate::proc::Frame;
use crate::proc::ProcHandle;
use crate::proc::Root;

// -----------------------------------------------------------------------------
// Outcome
// -----------------------------------------------------------------------------

/// Result of stepping one process for part of a tick.
#[derive(Debug)]
pub(crate) enum Outcome {
  /// Parked on an empty mailbox, suspended on a binding, or dead.
  Blocked,
  /// The root completed with nothing left on the stack.
  Exited(Result<Term, Term>),
  /// The shared step budget ran out while the process was still runnable.
  Preempted,
}

// -----------------------------------------------------------------------------
// Transition
// -----------------------------------------------------------------------------

enum Transition {
  /// The root was replaced with a new runnable task.
  Continue(Task),
  /// The root is a `Receive` waiting on an empty mailbox.
  Park(Task),
  /// A native binding was started.
  Suspend,
  /// The stack is empty; the process is done.
  Exit(Result<Term, Term>),
}

// -----------------------------------------------------------------------------
// Step
// -----------------------------------------------------------------------------

/// Steps `proc` until it blocks, exits, or `steps` reaches `limit`.
///
/// Every transition costs one step. No `RefCell` borrow of the process is
/// held while user callbacks or binding start functions run.
pub(crate) fn step(runtime: &Runtime, proc: &ProcHandle, steps: &mut u32, limit: u32) -> Outcome {
  loop {
    if *steps >= limit {
      return Outcome::Preempted;
    }

    let task: Task = {
      let mut data = proc.borrow_mut();

      match mem::replace(&mut data.root, Root::Stepping) {
        Root::Ready(task) => task,
        other => {
          data.root = other;
          return Outcome::Blocked;
        }
      }
    };

    *steps += 1;

    let transition: Transition = transition(runtime, proc, task);
    let mut data = proc.borrow_mut();

    // Killed from inside its own callback.
    if data.is_dead() {
      return Outcome::Blocked;
    }

    match transition {
      Transition::Continue(task) => {
        data.root = Root::Ready(task);
      }
      Transition::Park(task) => {
        data.root = Root::Ready(task);
        return Outcome::Blocked;
      }
      Transition::Suspend => {
        return Outcome::Blocked;
      }
      Transition::Exit(result) => {
        data.root = Root::Dead;
        data.mailbox.clear();
        return Outcome::Exited(result);
      }
    }
  }
}

fn transition(runtime: &Runtime, proc: &ProcHandle, task: Task) -> Transition {
  match task {
    Task::Succeed(value) => {
      let next: Option<Callback> = proc.borrow_mut().unwind_success();

      match next {
        Some(callback) => Transition::Continue(callback.call(value)),
        None => Transition::Exit(Ok(value)),
      }
    }
    Task::Fail(error) => {
      let next: Option<Callback> = proc.borrow_mut().unwind_failure();

      match next {
        Some(callback) => Transition::Continue(callback.call(error)),
        None => Transition::Exit(Err(error)),
      }
    }
    Task::AndThen(inner, callback) => {
      proc.borrow_mut().stack.push(Frame::AndThen(callback));
      Transition::Continue(*inner)
    }
    Task::OnError(inner, callback) => {
      proc.borrow_mut().stack.push(Frame::OnError(callback));
      Transition::Continue(*inner)
    }
    Task::Receive(callback) => {
      let message: Option<Term> = proc.borrow_mut().mailbox.pop_front();

      match message {
        Some(message) => Transition::Continue(callback.call(message)),
        None => Transition::Park(Task::Receive(callback)),
      }
    }
    Task::Native(binding) => {
      runtime.start_binding(proc, binding);
      Transition::Suspend
    }
  }
}
