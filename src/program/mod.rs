//! Application programs driven by effect managers.
//!
//! A program owns one application process. Every message it receives runs
//! one update cycle: `update` produces the next model and commands, the
//! model is rendered, and the commands together with the current
//! subscriptions are dispatched to every registered manager.
//!
//! # Examples
//!
//! ```
//! use errand::core::Task;
//! use errand::effects::{Cmd, Sub, TaskManager};
//! use errand::erts::{ManualHost, Runtime, RuntimeConfig};
//! use errand::program::{Application, Program, ProgramBuilder};
//!
//! struct Counter;
//!
//! impl Application for Counter {
//!   type Model = u32;
//!   type Msg = u32;
//!
//!   fn init(&self) -> (u32, Cmd<u32>) {
//!     (0, TaskManager::perform(Task::succeed(5_u32), |value| value.coerce::<u32>()))
//!   }
//!
//!   fn update(&self, msg: u32, model: u32) -> (u32, Cmd<u32>) {
//!     (model + msg, Cmd::none())
//!   }
//!
//!   fn subscriptions(&self, _model: &u32) -> Sub<u32> {
//!     Sub::none()
//!   }
//! }
//!
//! let host = ManualHost::new();
//! let runtime = Runtime::new(RuntimeConfig::new(), host.clone());
//!
//! let program: Program<Counter> = ProgramBuilder::new(Counter)
//!   .with_task_manager()
//!   .unwrap()
//!   .start(&runtime, |_model: &u32| {});
//!
//! program.send(1);
//! host.run_until_idle();
//!
//! assert_eq!(program.with_model(|model| *model), 6);
//! ```

mod dispatcher;

use std::rc::Rc;
use tracing::Level;
use tracing::Span;

use crate::core::Item;
use crate::core::Pid;
use crate::core::Term;
use crate::effects::Cmd;
use crate::effects::EffectManager;
use crate::effects::Home;
use crate::effects::ManagerTable;
use crate::effects::Router;
use crate::effects::Sub;
use crate::effects::TaskManager;
use crate::effects::manager_task;
use crate::error::Exception;
use crate::erts::Runtime;

use self::dispatcher::Dispatcher;
use self::dispatcher::main_task;

// -----------------------------------------------------------------------------
// Application
// -----------------------------------------------------------------------------

/// The pure part of a program.
pub trait Application: 'static {
  type Model: 'static;
  type Msg: Item;

  /// Returns the initial model and the commands to run at startup.
  fn init(&self) -> (Self::Model, Cmd<Self::Msg>);

  /// Returns the next model and the commands to run for `msg`.
  fn update(&self, msg: Self::Msg, model: Self::Model) -> (Self::Model, Cmd<Self::Msg>);

  /// Returns the subscriptions wanted for `model`.
  fn subscriptions(&self, model: &Self::Model) -> Sub<Self::Msg>;
}

// -----------------------------------------------------------------------------
// Program Builder
// -----------------------------------------------------------------------------

/// Collects effect managers before a program starts.
pub struct ProgramBuilder<A> {
  app: A,
  table: ManagerTable,
}

impl<A> ProgramBuilder<A>
where
  A: Application,
{
  #[inline]
  pub fn new(app: A) -> Self {
    Self {
      app,
      table: ManagerTable::new(),
    }
  }

  /// Registers `manager` under `home`.
  ///
  /// Returns an error if `home` is already registered.
  pub fn register<M>(mut self, home: Home, manager: M) -> Result<Self, Exception>
  where
    M: EffectManager,
  {
    self.table.register(home, manager)?;
    Ok(self)
  }

  /// Registers the built-in [`TaskManager`].
  #[inline]
  pub fn with_task_manager(self) -> Result<Self, Exception> {
    self.register(TaskManager::HOME, TaskManager)
  }

  /// Starts the program on `runtime`.
  ///
  /// Spawns one permanent process per registered manager, runs `init`,
  /// renders the initial model, spawns the application process, and
  /// dispatches the initial effects.
  pub fn start<R>(self, runtime: &Runtime, render: R) -> Program<A>
  where
    R: FnMut(&A::Model) + 'static,
  {
    let pid: Pid = runtime.alloc_pid();
    let span: Span = tracing::span!(target: "errand", Level::DEBUG, "program", %pid);
    let _enter = span.enter();

    let managers: Vec<(Home, Pid)> = self
      .table
      .entries()
      .iter()
      .map(|entry| {
        let this: Pid = runtime.alloc_pid();
        let router: Router = Router::new(pid, this);

        runtime.raw_spawn_as(
          this,
          Some(entry.home.as_str()),
          manager_task(entry.home, Rc::clone(&entry.manager), router),
        );

        (entry.home, this)
      })
      .collect();

    let dispatcher: Rc<Dispatcher<A>> = Rc::new(Dispatcher::new(
      self.app,
      self.table,
      managers,
      runtime.downgrade(),
      Box::new(render),
    ));

    dispatcher.start();

    runtime.raw_spawn_as(pid, Some("program"), main_task(Rc::clone(&dispatcher), span.clone()));

    tracing::debug!(
      target: "errand",
      %pid,
      managers = dispatcher.managers().len(),
      "program started",
    );

    Program {
      runtime: runtime.clone(),
      dispatcher,
      pid,
    }
  }
}

// -----------------------------------------------------------------------------
// Program
// -----------------------------------------------------------------------------

/// Handle to a running program.
pub struct Program<A>
where
  A: Application,
{
  runtime: Runtime,
  dispatcher: Rc<Dispatcher<A>>,
  pid: Pid,
}

impl<A> Program<A>
where
  A: Application,
{
  /// Returns the pid of the application process.
  #[inline]
  pub const fn pid(&self) -> Pid {
    self.pid
  }

  /// Delivers `msg` to the application as external input.
  #[inline]
  pub fn send(&self, msg: A::Msg) {
    self.runtime.raw_send(self.pid, Term::new(msg));
  }

  /// Calls `f` with the current model.
  ///
  /// # Panics
  ///
  /// Raises `SysInv` when called from inside `render` or `update`.
  #[inline]
  pub fn with_model<F, R>(&self, f: F) -> R
  where
    F: FnOnce(&A::Model) -> R,
  {
    self.dispatcher.with_model(f)
  }

  /// Returns the pid of the manager registered under `home`.
  pub fn manager(&self, home: Home) -> Option<Pid> {
    self
      .dispatcher
      .managers()
      .iter()
      .find(|(name, _)| *name == home)
      .map(|(_, pid)| *pid)
  }

  /// Returns the number of completed update cycles, not counting `init`.
  #[inline]
  pub fn updates(&self) -> u64 {
    self.dispatcher.updates()
  }
}
