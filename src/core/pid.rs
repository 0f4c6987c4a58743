use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use std::num::NonZeroU64;

/// Identifier of a process owned by a [`Runtime`].
///
/// Identifiers are allocated sequentially and never reused within one
/// runtime.
///
/// [`Runtime`]: crate::erts::Runtime
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Pid {
  bits: NonZeroU64,
}

impl Pid {
  #[inline]
  pub(crate) const fn new(bits: NonZeroU64) -> Self {
    Self { bits }
  }

  /// Returns the raw identifier.
  #[inline]
  pub const fn into_bits(self) -> u64 {
    self.bits.get()
  }
}

impl Debug for Pid {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for Pid {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "#PID<0.{}>", self.bits)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
