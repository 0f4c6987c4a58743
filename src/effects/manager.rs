use bitflags::bitflags;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result;
use std::rc::Rc;
use tracing::Level;
use tracing::Span;

use crate::core::Item;
use crate::core::Pid;
use crate::core::Task;
use crate::core::Term;
use crate::effects::Home;
use crate::effects::Router;
use crate::effects::Taggers;
use crate::raise;

// -----------------------------------------------------------------------------
// Manager Kind
// -----------------------------------------------------------------------------

bitflags! {
  /// The effect families a manager accepts.
  #[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
  pub struct ManagerKind: u8 {
    const CMD = 1 << 0;
    const SUB = 1 << 1;
  }
}

// -----------------------------------------------------------------------------
// Effect Manager
// -----------------------------------------------------------------------------

/// A long-lived process bridging declarative effects to imperative work.
///
/// Every update cycle the manager receives the commands and subscriptions
/// addressed to it through [`on_effects`], and messages it sent to itself
/// through [`on_self_msg`]. Both handlers return a task that succeeds with
/// the next state.
///
/// [`on_effects`]: EffectManager::on_effects
/// [`on_self_msg`]: EffectManager::on_self_msg
pub trait EffectManager: 'static {
  type State: Item;

  /// The effect families this manager accepts.
  fn kind(&self) -> ManagerKind;

  /// Returns a task that succeeds with the initial state.
  fn init(&self) -> Task;

  /// Handles the effects of one update cycle, including empty ones.
  fn on_effects(&self, router: &Router, cmds: Vec<Term>, subs: Vec<Term>, state: Self::State) -> Task;

  /// Handles a message the manager sent to itself.
  fn on_self_msg(&self, router: &Router, message: Term, state: Self::State) -> Task;

  /// Applies the tagger chain of a command leaf to its value.
  fn cmd_map(&self, taggers: &Taggers, value: Term) -> Term {
    taggers.apply(value)
  }

  /// Applies the tagger chain of a subscription leaf to its value.
  fn sub_map(&self, taggers: &Taggers, value: Term) -> Term {
    taggers.apply(value)
  }
}

// -----------------------------------------------------------------------------
// Dyn Manager
// -----------------------------------------------------------------------------

/// Object-safe form of [`EffectManager`] with an erased state.
pub(crate) trait DynManager {
  fn kind(&self) -> ManagerKind;

  fn init(&self) -> Task;

  fn on_effects(&self, router: &Router, effects: Effects, state: Term) -> Task;

  fn on_self_msg(&self, router: &Router, message: Term, state: Term) -> Task;

  fn cmd_map(&self, taggers: &Taggers, value: Term) -> Term;

  fn sub_map(&self, taggers: &Taggers, value: Term) -> Term;
}

impl<M> DynManager for M
where
  M: EffectManager,
{
  #[inline]
  fn kind(&self) -> ManagerKind {
    EffectManager::kind(self)
  }

  #[inline]
  fn init(&self) -> Task {
    EffectManager::init(self)
  }

  fn on_effects(&self, router: &Router, effects: Effects, state: Term) -> Task {
    EffectManager::on_effects(self, router, effects.cmds, effects.subs, state.coerce())
  }

  fn on_self_msg(&self, router: &Router, message: Term, state: Term) -> Task {
    EffectManager::on_self_msg(self, router, message, state.coerce())
  }

  #[inline]
  fn cmd_map(&self, taggers: &Taggers, value: Term) -> Term {
    EffectManager::cmd_map(self, taggers, value)
  }

  #[inline]
  fn sub_map(&self, taggers: &Taggers, value: Term) -> Term {
    EffectManager::sub_map(self, taggers, value)
  }
}

// -----------------------------------------------------------------------------
// Manager Messages
// -----------------------------------------------------------------------------

/// The effects of one update cycle addressed to one manager.
#[derive(Debug, Default)]
pub struct Effects {
  pub cmds: Vec<Term>,
  pub subs: Vec<Term>,
}

impl Effects {
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.cmds.is_empty() && self.subs.is_empty()
  }
}

/// A message received by a manager process.
#[derive(Debug)]
pub enum ManagerMsg {
  /// Sent by the dispatcher once per update cycle.
  Effects(Effects),
  /// Sent by the manager to itself through [`Router::send_to_self`].
  Internal(Term),
}

// -----------------------------------------------------------------------------
// Manager Loop
// -----------------------------------------------------------------------------

/// The root task of a manager process: `init`, then the receive loop.
pub(crate) fn manager_task(home: Home, manager: Rc<dyn DynManager>, router: Router) -> Task {
  let this: Pid = router.this();
  let span: Span = tracing::span!(target: "errand", Level::DEBUG, "manager", %home, %this);

  tracing::debug!(target: "errand", parent: &span, "initializing");

  manager.init().and_then(move |state: Term| {
    tracing::debug!(target: "errand", parent: &span, "polling");
    manager_loop(manager, router, span, state)
  })
}

fn manager_loop(manager: Rc<dyn DynManager>, router: Router, span: Span, state: Term) -> Task {
  Task::receive(move |message: Term| {
    let next: Task = match message.downcast::<ManagerMsg>() {
      Ok(ManagerMsg::Effects(effects)) => {
        tracing::trace!(
          target: "errand",
          parent: &span,
          cmds = effects.cmds.len(),
          subs = effects.subs.len(),
          "effects",
        );

        manager.on_effects(&router, effects, state)
      }
      Ok(ManagerMsg::Internal(message)) => {
        tracing::trace!(target: "errand", parent: &span, "self message");
        manager.on_self_msg(&router, message, state)
      }
      Err(other) => raise!(Error, SysInv, format!("{router:?} got foreign message {other:?}")),
    };

    let exit: Span = span.clone();

    next
      .on_error(move |error: Term| {
        tracing::debug!(target: "errand", parent: &exit, ?error, "exiting");
        Task::fail(error)
      })
      .and_then(move |state: Term| manager_loop(manager, router, span, state))
  })
}

impl Debug for dyn DynManager {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_struct("DynManager")
      .field("kind", &self.kind())
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
