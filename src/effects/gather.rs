//! Per-cycle effect gathering and dispatch.
//!
//! Gathering walks the command and subscription trees, accumulating
//! taggers through `Map` nodes. At each leaf the owning manager applies the
//! chain to the raw value, and the result is grouped by home. Dispatch then
//! sends every registered manager exactly one [`ManagerMsg::Effects`],
//! empty or not, so managers can tear down what is no longer wanted.

use hashbrown::HashMap;

use crate::core::Pid;
use crate::core::Term;
use crate::effects::Bag;
use crate::effects::Cmd;
use crate::effects::Effects;
use crate::effects::Home;
use crate::effects::ManagerKind;
use crate::effects::ManagerMsg;
use crate::effects::ManagerTable;
use crate::effects::Sub;
use crate::effects::Taggers;
use crate::erts::Runtime;
use crate::raise;

/// Groups the leaves of `cmds` and `subs` by manager.
///
/// # Panics
///
/// Raises `SysInv` if a leaf names an unregistered home, or a manager that
/// does not accept that effect family.
pub fn gather<M>(table: &ManagerTable, cmds: Cmd<M>, subs: Sub<M>) -> HashMap<Home, Effects> {
  let mut out: HashMap<Home, Effects> = HashMap::with_capacity(table.len());

  walk(table, cmds.into_bag(), &Taggers::new(), ManagerKind::CMD, &mut out);
  walk(table, subs.into_bag(), &Taggers::new(), ManagerKind::SUB, &mut out);

  out
}

fn walk(
  table: &ManagerTable,
  bag: Bag,
  taggers: &Taggers,
  kind: ManagerKind,
  out: &mut HashMap<Home, Effects>,
) {
  match bag {
    Bag::Leaf { home, value } => {
      let Some(manager) = table.get(home) else {
        raise!(Error, SysInv, format!("effect for unregistered manager {home}"));
      };

      if !manager.kind().contains(kind) {
        raise!(Error, SysInv, format!("manager {home} does not accept {kind:?}"));
      }

      let entry: &mut Effects = out.entry(home).or_default();

      if kind == ManagerKind::CMD {
        let value: Term = manager.cmd_map(taggers, value);
        entry.cmds.push(value);
      } else {
        let value: Term = manager.sub_map(taggers, value);
        entry.subs.push(value);
      }
    }
    Bag::Node(children) => {
      for child in children {
        walk(table, child, taggers, kind, out);
      }
    }
    Bag::Map { tagger, inner } => {
      walk(table, *inner, &taggers.push(tagger), kind, out);
    }
  }
}

/// Sends one [`ManagerMsg::Effects`] to every manager in `managers`.
///
/// Managers are visited in the given order; a manager missing from
/// `effects` receives an empty message.
pub(crate) fn dispatch(runtime: &Runtime, managers: &[(Home, Pid)], mut effects: HashMap<Home, Effects>) {
  for (home, pid) in managers {
    let message: Effects = effects.remove(home).unwrap_or_default();

    tracing::trace!(
      target: "errand",
      %home,
      %pid,
      cmds = message.cmds.len(),
      subs = message.subs.len(),
      "dispatch effects",
    );

    runtime.raw_send(*pid, Term::new(ManagerMsg::Effects(message)));
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
