use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result;
use std::rc::Rc;
use std::rc::Weak;
use std::time::Duration;

use crate::core::Cancel;
use crate::erts::Host;

type Thunk = Box<dyn FnOnce()>;

// -----------------------------------------------------------------------------
// Manual Host
// -----------------------------------------------------------------------------

/// A deterministic host driven explicitly by its owner.
///
/// Deferred ticks are queued until [`run_one`], [`run`], or
/// [`run_until_idle`] is called. Timers use a virtual clock that only moves
/// through [`advance`].
///
/// Clones share the same queues, so a runtime can own one clone while the
/// embedder drives another.
///
/// [`run_one`]: Self::run_one
/// [`run`]: Self::run
/// [`run_until_idle`]: Self::run_until_idle
/// [`advance`]: Self::advance
#[derive(Clone, Default)]
pub struct ManualHost {
  inner: Rc<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
  ticks: RefCell<VecDeque<Thunk>>,
  timers: RefCell<BTreeMap<(Duration, u64), Thunk>>,
  now: Cell<Duration>,
  seq: Cell<u64>,
}

impl ManualHost {
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the current virtual time.
  #[inline]
  pub fn now(&self) -> Duration {
    self.inner.now.get()
  }

  /// Returns the number of deferred ticks waiting to run.
  #[inline]
  pub fn pending_ticks(&self) -> usize {
    self.inner.ticks.borrow().len()
  }

  /// Returns the number of timers that have neither fired nor been
  /// cancelled.
  #[inline]
  pub fn pending_timers(&self) -> usize {
    self.inner.timers.borrow().len()
  }

  /// Runs the oldest deferred tick. Returns `false` if there was none.
  pub fn run_one(&self) -> bool {
    let tick: Option<Thunk> = self.inner.ticks.borrow_mut().pop_front();

    match tick {
      Some(tick) => {
        tick();
        true
      }
      None => false,
    }
  }

  /// Runs at most `max` deferred ticks, returning how many ran.
  pub fn run(&self, max: usize) -> usize {
    let mut count: usize = 0;

    while count < max && self.run_one() {
      count += 1;
    }

    count
  }

  /// Runs deferred ticks until none are left, returning how many ran.
  ///
  /// Never returns if some process stays runnable forever; use [`run`]
  /// for those.
  ///
  /// [`run`]: Self::run
  pub fn run_until_idle(&self) -> usize {
    let mut count: usize = 0;

    while self.run_one() {
      count += 1;
    }

    count
  }

  /// Moves the virtual clock forward by `by`.
  ///
  /// Due timers fire in deadline order, each one followed by
  /// [`run_until_idle`]. Returns the number of timers fired.
  ///
  /// [`run_until_idle`]: Self::run_until_idle
  pub fn advance(&self, by: Duration) -> usize {
    let until: Duration = self.now().saturating_add(by);
    let mut fired: usize = 0;

    self.run_until_idle();

    while let Some(fire) = self.next_due(until) {
      fire();
      fired += 1;
      self.run_until_idle();
    }

    self.inner.now.set(until);

    fired
  }

  fn next_due(&self, until: Duration) -> Option<Thunk> {
    let mut timers = self.inner.timers.borrow_mut();
    let key: (Duration, u64) = *timers.keys().next()?;

    if key.0 > until {
      return None;
    }

    self.inner.now.set(key.0);
    timers.remove(&key)
  }
}

impl Host for ManualHost {
  fn defer(&self, tick: Box<dyn FnOnce()>) {
    self.inner.ticks.borrow_mut().push_back(tick);
  }

  fn delay(&self, after: Duration, fire: Box<dyn FnOnce()>) -> Cancel {
    let seq: u64 = self.inner.seq.get();
    let key: (Duration, u64) = (self.now().saturating_add(after), seq);

    self.inner.seq.set(seq.wrapping_add(1));
    self.inner.timers.borrow_mut().insert(key, fire);

    let inner: Weak<ManualInner> = Rc::downgrade(&self.inner);

    Cancel::new(move || {
      if let Some(inner) = inner.upgrade() {
        let _ignore: Option<Thunk> = inner.timers.borrow_mut().remove(&key);
      }
    })
  }
}

impl Debug for ManualHost {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_struct("ManualHost")
      .field("now", &self.now())
      .field("ticks", &self.pending_ticks())
      .field("timers", &self.pending_timers())
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::rc::Rc;
  use std::time::Duration;

  use crate::core::Cancel;
  use crate::erts::Host;
  use crate::erts::ManualHost;

  fn record(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> Box<dyn FnOnce()> {
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::clone(log);
    Box::new(move || log.borrow_mut().push(name))
  }

  #[test]
  fn test_ticks_run_in_order() {
    let host: ManualHost = ManualHost::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    host.defer(record(&log, "a"));
    host.defer(record(&log, "b"));

    assert_eq!(host.pending_ticks(), 2);
    assert_eq!(host.run(1), 1);
    assert_eq!(*log.borrow(), ["a"]);
    assert_eq!(host.run_until_idle(), 1);
    assert_eq!(*log.borrow(), ["a", "b"]);
    assert!(!host.run_one());
  }

  #[test]
  fn test_timers_fire_in_deadline_order() {
    let host: ManualHost = ManualHost::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    let _a: Cancel = host.delay(Duration::from_millis(30), record(&log, "late"));
    let _b: Cancel = host.delay(Duration::from_millis(10), record(&log, "early"));
    let _c: Cancel = host.delay(Duration::from_millis(10), record(&log, "early-2"));

    assert_eq!(host.advance(Duration::from_millis(20)), 2);
    assert_eq!(*log.borrow(), ["early", "early-2"]);
    assert_eq!(host.now(), Duration::from_millis(20));
    assert_eq!(host.pending_timers(), 1);

    assert_eq!(host.advance(Duration::from_millis(10)), 1);
    assert_eq!(*log.borrow(), ["early", "early-2", "late"]);
  }

  #[test]
  fn test_cancelled_timer_never_fires() {
    let host: ManualHost = ManualHost::new();
    let log: Rc<RefCell<Vec<&'static str>>> = Rc::default();

    let cancel: Cancel = host.delay(Duration::from_secs(1), record(&log, "fired"));

    cancel.cancel();

    assert_eq!(host.pending_timers(), 0);
    assert_eq!(host.advance(Duration::from_secs(2)), 0);
    assert!(log.borrow().is_empty());
  }

  #[test]
  fn test_timer_sees_deadline_as_now() {
    let host: ManualHost = ManualHost::new();
    let seen: Rc<RefCell<Option<Duration>>> = Rc::default();
    let slot: Rc<RefCell<Option<Duration>>> = Rc::clone(&seen);
    let clock: ManualHost = host.clone();

    let _cancel: Cancel = host.delay(
      Duration::from_millis(5),
      Box::new(move || *slot.borrow_mut() = Some(clock.now())),
    );

    host.advance(Duration::from_millis(50));

    assert_eq!(*seen.borrow(), Some(Duration::from_millis(5)));
  }
}
