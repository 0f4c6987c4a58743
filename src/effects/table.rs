use hashbrown::HashMap;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result;
use std::rc::Rc;

use crate::consts::CAP_REGISTERED_MANAGERS;
use crate::effects::DynManager;
use crate::effects::EffectManager;
use crate::effects::Home;
use crate::effects::ManagerKind;
use crate::error::Exception;
use crate::error::ExceptionClass;
use crate::error::ExceptionGroup;

// -----------------------------------------------------------------------------
// Manager Table
// -----------------------------------------------------------------------------

/// The set of effect managers registered before a program starts.
///
/// Append-only; entries keep their registration order.
#[derive(Default)]
pub struct ManagerTable {
  entries: Vec<ManagerEntry>,
  index: HashMap<Home, usize>,
}

pub(crate) struct ManagerEntry {
  pub(crate) home: Home,
  pub(crate) manager: Rc<dyn DynManager>,
}

impl ManagerTable {
  #[inline]
  pub fn new() -> Self {
    Self {
      entries: Vec::with_capacity(CAP_REGISTERED_MANAGERS),
      index: HashMap::with_capacity(CAP_REGISTERED_MANAGERS),
    }
  }

  /// Registers `manager` under `home`.
  ///
  /// Returns an error if `home` is already taken.
  pub fn register<M>(&mut self, home: Home, manager: M) -> std::result::Result<(), Exception>
  where
    M: EffectManager,
  {
    if self.index.contains_key(&home) {
      return Err(Exception::new(
        ExceptionClass::Error,
        ExceptionGroup::BadArg,
        format!("manager {home} already registered"),
      ));
    }

    tracing::debug!(
      target: "errand",
      %home,
      kind = ?EffectManager::kind(&manager),
      "manager registered",
    );

    self.index.insert(home, self.entries.len());
    self.entries.push(ManagerEntry {
      home,
      manager: Rc::new(manager),
    });

    Ok(())
  }

  #[inline]
  pub fn contains(&self, home: Home) -> bool {
    self.index.contains_key(&home)
  }

  /// Returns the effect families accepted by the manager at `home`.
  #[inline]
  pub fn kind(&self, home: Home) -> Option<ManagerKind> {
    self.get(home).map(|manager| manager.kind())
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Returns registered homes in registration order.
  pub fn homes(&self) -> impl Iterator<Item = Home> + '_ {
    self.entries.iter().map(|entry| entry.home)
  }

  #[inline]
  pub(crate) fn get(&self, home: Home) -> Option<&Rc<dyn DynManager>> {
    self.index.get(&home).map(|index| &self.entries[*index].manager)
  }

  #[inline]
  pub(crate) fn entries(&self) -> &[ManagerEntry] {
    &self.entries
  }
}

impl Debug for ManagerTable {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_map()
      .entries(self.entries.iter().map(|entry| (entry.home, &entry.manager)))
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
