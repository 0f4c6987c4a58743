//! Cooperative work queue and pump.
//!
//! Runnable processes wait in a FIFO queue. The first enqueue while the pump
//! is disarmed defers one tick through the [`Host`] and arms the pump. A
//! tick steps queued processes against a single shared budget; it disarms
//! when the queue drains and defers another tick otherwise.
//!
//! [`Host`]: crate::erts::Host

use std::rc::Rc;
use std::time::Duration;

use crate::core::Binding;
use crate::core::Complete;
use crate::core::Pid;
use crate::core::Task;
use crate::core::Term;
use crate::erts::Runtime;
use crate::erts::WeakRuntime;
use crate::proc::Outcome;
use crate::proc::ProcHandle;
use crate::proc::Root;
use crate::proc::step;
use crate::raise;
use crate::utils::measure_fn;

impl Runtime {
  // ---------------------------------------------------------------------------
  // Work Queue
  // ---------------------------------------------------------------------------

  /// Appends `proc` to the work queue and arms the pump if needed.
  pub(crate) fn enqueue(&self, proc: &ProcHandle) {
    {
      let mut data = proc.borrow_mut();

      if data.queued || data.is_dead() {
        return;
      }

      data.queued = true;
    }

    self.inner.queue.borrow_mut().push_back(Rc::clone(proc));

    if !self.inner.armed.replace(true) {
      self.defer_tick();
    }
  }

  fn dequeue(&self) -> Option<ProcHandle> {
    let proc: ProcHandle = self.inner.queue.borrow_mut().pop_front()?;
    proc.borrow_mut().queued = false;
    Some(proc)
  }

  fn defer_tick(&self) {
    let this: WeakRuntime = self.downgrade();

    self.inner.host.defer(Box::new(move || {
      if let Some(runtime) = this.upgrade() {
        runtime.tick();
      }
    }));
  }

  // ---------------------------------------------------------------------------
  // Pump
  // ---------------------------------------------------------------------------

  /// Runs one pump tick.
  pub(crate) fn tick(&self) {
    let limit: u32 = self.inner.config.step_budget.get();

    let ((steps, stepped), elapsed): ((u32, usize), Duration) = measure_fn(|| {
      let mut steps: u32 = 0;
      let mut stepped: usize = 0;

      while steps < limit {
        let Some(proc) = self.dequeue() else {
          break;
        };

        if proc.borrow().is_dead() {
          continue;
        }

        stepped += 1;

        match step(self, &proc, &mut steps, limit) {
          Outcome::Blocked => {
            steps = steps.saturating_add(1);
          }
          Outcome::Exited(result) => {
            steps = steps.saturating_add(1);
            self.exit(&proc, result);
          }
          Outcome::Preempted => {
            self.enqueue(&proc);
          }
        }
      }

      (steps, stepped)
    });

    let tick: u64 = self.inner.ticks.get().wrapping_add(1);
    let drained: bool = self.inner.queue.borrow().is_empty();

    self.inner.ticks.set(tick);

    tracing::trace!(
      target: "errand",
      tick,
      steps,
      stepped,
      drained,
      elapsed = ?elapsed,
      "pump tick",
    );

    if drained {
      self.inner.armed.set(false);
    } else {
      self.defer_tick();
    }
  }

  fn exit(&self, proc: &ProcHandle, result: Result<Term, Term>) {
    let (pid, label): (Pid, Option<&'static str>) = {
      let data = proc.borrow();
      (data.pid, data.label)
    };

    self.inner.procs.borrow_mut().remove(&pid);

    match (label, result) {
      (Some(label), Ok(value)) => {
        tracing::warn!(target: "errand", %pid, label, ?value, "permanent process exited");
      }
      (Some(label), Err(error)) => {
        tracing::warn!(target: "errand", %pid, label, ?error, "permanent process failed");
      }
      (None, Ok(value)) => {
        tracing::debug!(target: "errand", %pid, ?value, "process exited");
      }
      (None, Err(error)) => {
        tracing::debug!(target: "errand", %pid, ?error, "process failed");
      }
    }
  }

  // ---------------------------------------------------------------------------
  // Native Bindings
  // ---------------------------------------------------------------------------

  /// Suspends `proc` on `binding` and invokes its start function.
  pub(crate) fn start_binding(&self, proc: &ProcHandle, binding: Binding) {
    let (id, pid): (u64, Pid) = {
      let mut data = proc.borrow_mut();

      data.binding = data.binding.wrapping_add(1);
      data.root = Root::Awaiting {
        binding: data.binding,
        cancel: None,
      };

      (data.binding, data.pid)
    };

    tracing::trace!(target: "errand", %pid, binding = id, "binding started");

    let complete: Complete = Complete::new(self.downgrade(), proc, id, pid);

    let Some(cancel) = binding.start(complete) else {
      return;
    };

    let mut data = proc.borrow_mut();

    if data.is_dead() {
      drop(data);
      cancel.cancel();
      return;
    }

    if let Root::Awaiting { binding, cancel: slot } = &mut data.root {
      if *binding == id {
        *slot = Some(cancel);
      }
    }
  }

  /// Replaces the root of a process suspended on `binding` with `task`.
  pub(crate) fn resume(&self, proc: &ProcHandle, binding: u64, task: Task) {
    {
      let mut data = proc.borrow_mut();

      match &data.root {
        Root::Awaiting { binding: id, .. } if *id == binding => {}
        Root::Dead => {
          tracing::trace!(target: "errand", pid = %data.pid, binding, "completion ignored");
          return;
        }
        // `Complete` is consumed on use and only it advances the binding id.
        Root::Ready(_) | Root::Stepping | Root::Awaiting { .. } => {
          raise!(Error, SysInv, format!("binding {binding} resumed while not awaiting"));
        }
      }

      data.root = Root::Ready(task);
    }

    self.enqueue(proc);
  }
}
