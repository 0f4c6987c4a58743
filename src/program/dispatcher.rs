use hashbrown::HashMap;
use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::Span;

use crate::core::Pid;
use crate::core::Task;
use crate::core::Term;
use crate::effects::Cmd;
use crate::effects::Effects;
use crate::effects::Home;
use crate::effects::ManagerTable;
use crate::effects::Sub;
use crate::effects::dispatch;
use crate::effects::gather;
use crate::erts::WeakRuntime;
use crate::program::Application;
use crate::raise;

pub(crate) type Render<M> = Box<dyn FnMut(&M)>;

// -----------------------------------------------------------------------------
// Dispatcher
// -----------------------------------------------------------------------------

/// Owns the application model and drives one update cycle per message.
pub(crate) struct Dispatcher<A>
where
  A: Application,
{
  app: A,
  model: RefCell<Option<A::Model>>,
  render: RefCell<Render<A::Model>>,
  table: ManagerTable,
  managers: Vec<(Home, Pid)>,
  runtime: WeakRuntime,
  updates: Cell<u64>,
}

impl<A> Dispatcher<A>
where
  A: Application,
{
  pub(crate) fn new(
    app: A,
    table: ManagerTable,
    managers: Vec<(Home, Pid)>,
    runtime: WeakRuntime,
    render: Render<A::Model>,
  ) -> Self {
    Self {
      app,
      model: RefCell::new(None),
      render: RefCell::new(render),
      table,
      managers,
      runtime,
      updates: Cell::new(0),
    }
  }

  #[inline]
  pub(crate) fn managers(&self) -> &[(Home, Pid)] {
    &self.managers
  }

  #[inline]
  pub(crate) fn updates(&self) -> u64 {
    self.updates.get()
  }

  pub(crate) fn with_model<F, R>(&self, f: F) -> R
  where
    F: FnOnce(&A::Model) -> R,
  {
    match &*self.model.borrow() {
      Some(model) => f(model),
      None => raise!(Error, SysInv, "model accessed during update"),
    }
  }

  /// Runs `init`, renders the initial model, and dispatches its effects.
  pub(crate) fn start(&self) {
    let (model, cmd): (A::Model, Cmd<A::Msg>) = self.app.init();
    self.commit(model, cmd);
  }

  /// Runs one update cycle for `message`.
  pub(crate) fn update(&self, message: Term) {
    let message: A::Msg = match message.downcast::<A::Msg>() {
      Ok(message) => message,
      Err(other) => raise!(Error, BadArg, format!("unexpected program message {other:?}")),
    };

    let Some(model) = self.model.borrow_mut().take() else {
      raise!(Error, SysInv, "model missing");
    };

    let (model, cmd): (A::Model, Cmd<A::Msg>) = self.app.update(message, model);

    self.updates.set(self.updates.get() + 1);
    self.commit(model, cmd);
  }

  fn commit(&self, model: A::Model, cmd: Cmd<A::Msg>) {
    (self.render.borrow_mut())(&model);

    let sub: Sub<A::Msg> = self.app.subscriptions(&model);

    *self.model.borrow_mut() = Some(model);

    let effects: HashMap<Home, Effects> = gather(&self.table, cmd, sub);

    let Some(runtime) = self.runtime.upgrade() else {
      return;
    };

    dispatch(&runtime, &self.managers, effects);
  }
}

// -----------------------------------------------------------------------------
// Main Loop
// -----------------------------------------------------------------------------

/// The root task of the application process.
pub(crate) fn main_task<A>(dispatcher: Rc<Dispatcher<A>>, span: Span) -> Task
where
  A: Application,
{
  Task::receive(move |message: Term| {
    let this: Rc<Dispatcher<A>> = Rc::clone(&dispatcher);
    let parent: Span = span.clone();

    Task::effect(move || {
      tracing::trace!(target: "errand", parent: &parent, "update");
      this.update(message);
      Task::succeed(())
    })
    .and_then(move |_: Term| main_task(dispatcher, span))
  })
}
