use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

/// Exception category indicating the nature of the error.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExceptionGroup {
  /// A value of the wrong type crossed a runtime boundary.
  ///
  /// Raised when a [`Term`] does not hold the type the receiver expects,
  /// e.g. an application message or a manager state, and returned for a
  /// duplicate manager registration.
  ///
  /// [`Term`]: crate::core::Term
  BadArg,
  /// System capacity limit exceeded.
  SysCap,
  /// Invalid system operation or state.
  ///
  /// Raised for protocol violations such as effects addressed to an
  /// unregistered manager or a foreign message in a manager mailbox.
  SysInv,
}

impl ExceptionGroup {
  #[inline]
  pub(crate) const fn label(&self) -> &'static str {
    match self {
      Self::BadArg => "badarg",
      Self::SysCap => "syscap",
      Self::SysInv => "sysinv",
    }
  }
}

impl Display for ExceptionGroup {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::BadArg => f.write_str("(BadArg) errors were found with the given argument(s)"),
      Self::SysCap => f.write_str("(SysCap) a system limit has been reached"),
      Self::SysInv => f.write_str("(SysInv) a system invariant has been broken"),
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::error::ExceptionGroup;

  #[test]
  fn test_display() {
    let badarg: String = format!("{}", ExceptionGroup::BadArg);
    let syscap: String = format!("{}", ExceptionGroup::SysCap);
    let sysinv: String = format!("{}", ExceptionGroup::SysInv);

    assert!(badarg.starts_with("(BadArg)"));
    assert!(syscap.starts_with("(SysCap)"));
    assert!(sysinv.starts_with("(SysInv)"));
  }

  #[test]
  fn test_label() {
    assert_eq!(ExceptionGroup::BadArg.label(), "badarg");
    assert_eq!(ExceptionGroup::SysCap.label(), "syscap");
    assert_eq!(ExceptionGroup::SysInv.label(), "sysinv");
  }
}
