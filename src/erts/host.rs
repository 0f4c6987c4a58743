use std::time::Duration;

use crate::core::Cancel;

/// The event loop a [`Runtime`] is embedded in.
///
/// The runtime never blocks. It hands each pump tick to [`Host::defer`] and
/// each timer to [`Host::delay`], and makes progress only when the host
/// runs them.
///
/// [`Runtime`]: crate::erts::Runtime
pub trait Host {
  /// Runs `tick` on a later turn of the host loop.
  fn defer(&self, tick: Box<dyn FnOnce()>);

  /// Runs `fire` once `after` has elapsed, unless the returned thunk is
  /// invoked first.
  fn delay(&self, after: Duration, fire: Box<dyn FnOnce()>) -> Cancel;
}
