use crate::core::Item;
use crate::core::Pid;
use crate::core::Task;
use crate::core::Term;
use crate::effects::ManagerMsg;
use crate::erts::Process;

/// Capability handle given to an effect manager.
///
/// Lets the manager message the application process or its own process.
/// Created once per manager when the program starts.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct Router {
  app: Pid,
  this: Pid,
}

impl Router {
  #[inline]
  pub(crate) const fn new(app: Pid, this: Pid) -> Self {
    Self { app, this }
  }

  /// Returns the pid of the application process.
  #[inline]
  pub const fn app(&self) -> Pid {
    self.app
  }

  /// Returns the pid of the manager process.
  #[inline]
  pub const fn this(&self) -> Pid {
    self.this
  }

  /// Returns a task that delivers `message` to the application.
  #[inline]
  pub fn send_to_app<T>(&self, message: T) -> Task
  where
    T: Item,
  {
    Process::send(self.app, message)
  }

  /// Returns a task that delivers `message` to [`on_self_msg`] of this
  /// manager.
  ///
  /// [`on_self_msg`]: crate::effects::EffectManager::on_self_msg
  #[inline]
  pub fn send_to_self<T>(&self, message: T) -> Task
  where
    T: Item,
  {
    Process::send(self.this, ManagerMsg::Internal(Term::new(message)))
  }
}
