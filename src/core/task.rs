//! Inert descriptions of possibly-asynchronous work.
//!
//! A [`Task`] never executes by itself. It is a tree of constructors that a
//! process steps through once the task has been spawned onto a [`Runtime`].
//! Side effects happen only when a process reaches a [`Task::Native`] node.
//!
//! # Examples
//!
//! ```
//! use errand::core::{Task, Term};
//!
//! let task: Task = Task::fail("boom")
//!   .and_then(|_: Term| Task::succeed("unreachable"))
//!   .on_error(|error: Term| Task::succeed(format!("recovered from {error}")));
//! ```
//!
//! [`Runtime`]: crate::erts::Runtime

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::vec::IntoIter;

use crate::core::Cancel;
use crate::core::Complete;
use crate::core::Item;
use crate::core::Term;

// -----------------------------------------------------------------------------
// Task
// -----------------------------------------------------------------------------

/// An immutable description of a unit of work.
pub enum Task {
  /// Completes successfully with the given value.
  Succeed(Term),
  /// Completes with the given error.
  Fail(Term),
  /// Invokes an external operation and suspends until it completes.
  Native(Binding),
  /// Runs the inner task, then feeds its value to the continuation.
  AndThen(Box<Task>, Callback),
  /// Runs the inner task, feeding any error to the handler.
  OnError(Box<Task>, Callback),
  /// Waits for the next message in the process mailbox.
  Receive(Callback),
}

impl Task {
  /// Creates a task that succeeds with `value`.
  #[inline]
  pub fn succeed<T>(value: T) -> Self
  where
    T: Item,
  {
    Self::Succeed(Term::new(value))
  }

  /// Creates a task that fails with `error`.
  #[inline]
  pub fn fail<E>(error: E) -> Self
  where
    E: Item,
  {
    Self::Fail(Term::new(error))
  }

  /// Creates a task from a `Result`.
  #[inline]
  pub fn from_result<T, E>(result: Result<T, E>) -> Self
  where
    T: Item,
    E: Item,
  {
    match result {
      Ok(value) => Self::succeed(value),
      Err(error) => Self::fail(error),
    }
  }

  /// Creates a task bound to an external operation.
  ///
  /// `start` is invoked exactly once, when a process first reaches this
  /// task. It receives the single-shot [`Complete`] handle that resumes the
  /// process, and may return a [`Cancel`] thunk that is invoked if the
  /// process is killed while waiting.
  #[inline]
  pub fn native<F>(start: F) -> Self
  where
    F: FnOnce(Complete) -> Option<Cancel> + 'static,
  {
    Self::Native(Binding::new(start))
  }

  /// Creates a task that waits for the next mailbox message.
  #[inline]
  pub fn receive<F>(f: F) -> Self
  where
    F: FnOnce(Term) -> Task + 'static,
  {
    Self::Receive(Callback::new(f))
  }

  /// Chains a continuation that runs when this task succeeds.
  #[inline]
  pub fn and_then<F>(self, f: F) -> Self
  where
    F: FnOnce(Term) -> Task + 'static,
  {
    Self::AndThen(Box::new(self), Callback::new(f))
  }

  /// Chains a handler that runs when this task fails.
  #[inline]
  pub fn on_error<F>(self, f: F) -> Self
  where
    F: FnOnce(Term) -> Task + 'static,
  {
    Self::OnError(Box::new(self), Callback::new(f))
  }

  /// Transforms the success value of this task.
  #[inline]
  pub fn map<F>(self, f: F) -> Self
  where
    F: FnOnce(Term) -> Term + 'static,
  {
    self.and_then(move |value: Term| Self::Succeed(f(value)))
  }

  /// Transforms the error value of this task.
  #[inline]
  pub fn map_err<F>(self, f: F) -> Self
  where
    F: FnOnce(Term) -> Term + 'static,
  {
    self.on_error(move |error: Term| Self::Fail(f(error)))
  }

  /// Runs `tasks` in order, collecting their values into a `Vec<Term>`.
  ///
  /// Stops at the first failure and fails with that error.
  pub fn sequence<I>(tasks: I) -> Self
  where
    I: IntoIterator<Item = Task>,
  {
    fn next(mut rest: IntoIter<Task>, mut done: Vec<Term>) -> Task {
      match rest.next() {
        Some(task) => task.and_then(move |value: Term| {
          done.push(value);
          next(rest, done)
        }),
        None => Task::succeed(done),
      }
    }

    let tasks: Vec<Task> = tasks.into_iter().collect();
    let count: usize = tasks.len();

    next(tasks.into_iter(), Vec::with_capacity(count))
  }

  /// Runs `f` when a process reaches this task and continues with the task
  /// it returns.
  #[inline]
  pub(crate) fn effect<F>(f: F) -> Self
  where
    F: FnOnce() -> Task + 'static,
  {
    Self::native(move |complete: Complete| {
      complete.complete(f());
      None
    })
  }

  /// Returns `true` if this is a [`Task::Succeed`].
  #[inline]
  pub const fn is_succeed(&self) -> bool {
    matches!(self, Self::Succeed(_))
  }

  /// Returns `true` if this is a [`Task::Fail`].
  #[inline]
  pub const fn is_fail(&self) -> bool {
    matches!(self, Self::Fail(_))
  }
}

impl Debug for Task {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Succeed(value) => f.debug_tuple("Succeed").field(value).finish(),
      Self::Fail(error) => f.debug_tuple("Fail").field(error).finish(),
      Self::Native(_) => f.write_str("Native(..)"),
      Self::AndThen(inner, _) => f.debug_tuple("AndThen").field(inner).finish_non_exhaustive(),
      Self::OnError(inner, _) => f.debug_tuple("OnError").field(inner).finish_non_exhaustive(),
      Self::Receive(_) => f.write_str("Receive(..)"),
    }
  }
}

// -----------------------------------------------------------------------------
// Callback
// -----------------------------------------------------------------------------

/// A single-use continuation producing the next task.
#[repr(transparent)]
pub struct Callback {
  inner: Box<dyn FnOnce(Term) -> Task>,
}

impl Callback {
  #[inline]
  pub fn new<F>(f: F) -> Self
  where
    F: FnOnce(Term) -> Task + 'static,
  {
    Self { inner: Box::new(f) }
  }

  #[inline]
  pub fn call(self, value: Term) -> Task {
    (self.inner)(value)
  }
}

impl Debug for Callback {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("Callback(..)")
  }
}

// -----------------------------------------------------------------------------
// Binding
// -----------------------------------------------------------------------------

/// The start function of a [`Task::Native`].
#[repr(transparent)]
pub struct Binding {
  start: Box<dyn FnOnce(Complete) -> Option<Cancel>>,
}

impl Binding {
  #[inline]
  pub fn new<F>(start: F) -> Self
  where
    F: FnOnce(Complete) -> Option<Cancel> + 'static,
  {
    Self {
      start: Box::new(start),
    }
  }

  #[inline]
  pub(crate) fn start(self, complete: Complete) -> Option<Cancel> {
    (self.start)(complete)
  }
}

impl Debug for Binding {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.write_str("Binding(..)")
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::core::Task;
  use crate::core::Term;

  #[test]
  fn test_constructors() {
    assert!(Task::succeed(1).is_succeed());
    assert!(Task::fail("e").is_fail());
    assert!(Task::from_result::<i32, &str>(Ok(1)).is_succeed());
    assert!(Task::from_result::<i32, &str>(Err("e")).is_fail());
  }

  #[test]
  fn test_and_then_is_inert() {
    let task: Task = Task::succeed(1).and_then(|_: Term| panic!("must not run"));

    assert!(matches!(task, Task::AndThen(_, _)));
  }

  #[test]
  fn test_callback_call() {
    let task: Task = Task::receive(|message: Term| Task::Succeed(message));

    let Task::Receive(callback) = task else {
      panic!("expected receive");
    };

    match callback.call(Term::new(5_u8)) {
      Task::Succeed(value) => assert_eq!(value.coerce::<u8>(), 5),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn test_debug() {
    let task: Task = Task::succeed(1).on_error(Task::Fail);

    assert_eq!(format!("{task:?}"), "OnError(Succeed(1), ..)");
    assert_eq!(format!("{:?}", Task::native(|_| None)), "Native(..)");
  }
}
