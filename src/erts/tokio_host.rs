use std::time::Duration;
use tokio::task;
use tokio::task::JoinHandle;
use tokio::time;

use crate::core::Cancel;
use crate::erts::Host;

/// Host backed by the tokio [`LocalSet`] of the current thread.
///
/// Each deferred tick is a separate local task, so other local tasks run
/// between ticks. Must be used from within a `LocalSet`, which
/// [`init::block_on`] provides.
///
/// [`LocalSet`]: tokio::task::LocalSet
/// [`init::block_on`]: crate::init::block_on
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioHost;

impl TokioHost {
  #[inline]
  pub const fn new() -> Self {
    Self
  }
}

impl Host for TokioHost {
  fn defer(&self, tick: Box<dyn FnOnce()>) {
    let _ignore: JoinHandle<()> = task::spawn_local(async move {
      tick();
    });
  }

  fn delay(&self, after: Duration, fire: Box<dyn FnOnce()>) -> Cancel {
    let handle: JoinHandle<()> = task::spawn_local(async move {
      time::sleep(after).await;
      fire();
    });

    Cancel::new(move || handle.abort())
  }
}
