use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::consts::TASK_MANAGER_HOME;
use crate::core::Item;
use crate::core::Task;
use crate::core::Term;
use crate::effects::Cmd;
use crate::effects::EffectManager;
use crate::effects::Home;
use crate::effects::ManagerKind;
use crate::effects::Router;
use crate::effects::Taggers;
use crate::erts::Process;

// -----------------------------------------------------------------------------
// Task Manager
// -----------------------------------------------------------------------------

/// Built-in manager that runs tasks as commands.
///
/// Each command runs in its own child process. When the task succeeds, the
/// tagged result is sent to the application.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskManager;

impl TaskManager {
  pub const HOME: Home = Home::new(TASK_MANAGER_HOME);

  /// Runs `task` and sends `f(value)` to the application when it succeeds.
  ///
  /// A failure of `task` ends its child process without a message.
  pub fn perform<M, F>(task: Task, f: F) -> Cmd<M>
  where
    M: Item,
    F: FnOnce(Term) -> M + 'static,
  {
    Cmd::leaf(Self::HOME, Command(task.map(move |value: Term| Term::new(f(value)))))
  }

  /// Runs `task` and sends `f(result)` to the application when it
  /// completes either way.
  pub fn attempt<M, F>(task: Task, f: F) -> Cmd<M>
  where
    M: Item,
    F: FnOnce(Result<Term, Term>) -> M + 'static,
  {
    let task: Task = task
      .map(|value: Term| Term::new(Ok::<Term, Term>(value)))
      .on_error(|error: Term| Task::succeed(Err::<Term, Term>(error)))
      .map(move |result: Term| Term::new(f(result.coerce::<Result<Term, Term>>())));

    Cmd::leaf(Self::HOME, Command(task))
  }
}

impl EffectManager for TaskManager {
  type State = ();

  fn kind(&self) -> ManagerKind {
    ManagerKind::CMD
  }

  fn init(&self) -> Task {
    Task::succeed(())
  }

  fn on_effects(&self, router: &Router, cmds: Vec<Term>, _subs: Vec<Term>, state: ()) -> Task {
    let router: Router = *router;

    let spawns = cmds.into_iter().map(move |command: Term| {
      let Command(task) = command.coerce::<Command>();
      Process::spawn(task.and_then(move |message: Term| router.send_to_app(message)))
    });

    Task::sequence(spawns).map(move |_: Term| Term::new(state))
  }

  fn on_self_msg(&self, _router: &Router, _message: Term, state: ()) -> Task {
    Task::succeed(state)
  }

  fn cmd_map(&self, taggers: &Taggers, value: Term) -> Term {
    let Command(task) = value.coerce::<Command>();
    let taggers: Taggers = taggers.clone();

    Term::new(Command(task.map(move |value: Term| taggers.apply(value))))
  }
}

// -----------------------------------------------------------------------------
// Command
// -----------------------------------------------------------------------------

struct Command(Task);

impl Debug for Command {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_tuple("Command").field(&self.0).finish()
  }
}
