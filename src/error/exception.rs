use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

use crate::error::ExceptionClass;
use crate::error::ExceptionGroup;

/// A structured exception with class, group, message, and backtrace.
///
/// Exceptions are either returned from fallible setup paths or raised via
/// the [`raise!`] macro when an embedding contract is broken.
///
/// # Display Format
///
/// Exceptions format as: `{class}:{group} - {message}`
///
/// Example: `error:badarg - manager already registered: Task`
///
/// [`raise!`]: crate::raise
pub struct Exception {
  class: ExceptionClass,
  group: ExceptionGroup,
  error: String,
  trace: Backtrace,
}

impl Exception {
  /// Creates a new exception with the given class, group, and message.
  ///
  /// Captures a backtrace at the call site.
  ///
  /// # Examples
  ///
  /// ```
  /// use errand::error::{Exception, ExceptionClass, ExceptionGroup};
  ///
  /// let exception = Exception::new(
  ///   ExceptionClass::Error,
  ///   ExceptionGroup::BadArg,
  ///   "invalid input",
  /// );
  ///
  /// assert_eq!(exception.error(), "invalid input");
  /// ```
  #[inline]
  pub fn new<T>(class: ExceptionClass, group: ExceptionGroup, error: T) -> Self
  where
    T: Display,
  {
    Self {
      class,
      group,
      error: error.to_string(),
      trace: Backtrace::capture(),
    }
  }

  /// Returns the exception's severity class.
  #[inline]
  pub const fn class(&self) -> ExceptionClass {
    self.class
  }

  /// Returns the exception's error category.
  #[inline]
  pub const fn group(&self) -> ExceptionGroup {
    self.group
  }

  /// Returns the human-readable error message.
  #[inline]
  pub const fn error(&self) -> &str {
    self.error.as_str()
  }

  /// Returns the captured backtrace.
  ///
  /// Backtrace availability depends on the `RUST_BACKTRACE` environment
  /// variable and platform support.
  #[inline]
  pub const fn trace(&self) -> &Backtrace {
    &self.trace
  }
}

impl Debug for Exception {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for Exception {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "{}:{} - {}", self.class, self.group.label(), self.error)
  }
}

impl Error for Exception {}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::error::Exception;
  use crate::error::ExceptionClass;
  use crate::error::ExceptionGroup;

  #[test]
  fn test_accessors() {
    let exception: Exception = Exception::new(ExceptionClass::Error, ExceptionGroup::SysInv, 42);

    assert_eq!(exception.class(), ExceptionClass::Error);
    assert_eq!(exception.group(), ExceptionGroup::SysInv);
    assert_eq!(exception.error(), "42");
  }

  #[test]
  fn test_display() {
    let exception: Exception = Exception::new(
      ExceptionClass::Error,
      ExceptionGroup::BadArg,
      "unexpected message",
    );

    assert_eq!(format!("{exception}"), "error:badarg - unexpected message");
  }

  #[test]
  fn test_debug_equals_display() {
    let exception: Exception = Exception::new(ExceptionClass::Error, ExceptionGroup::SysCap, "full");

    assert_eq!(format!("{exception}"), format!("{exception:?}"));
  }
}
