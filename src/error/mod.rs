//! Exception handling and error types for the Errand runtime.
//!
//! Errand distinguishes two kinds of failure:
//!
//! 1. **Task failures** are ordinary data. A [`Task`] that fails carries its
//!    error as a [`Term`] and is recovered with [`Task::on_error`]. They never
//!    surface as a Rust error.
//! 2. **Contract violations** are bugs in the embedding code: a message of the
//!    wrong type sent to an application, an effect addressed to a manager that
//!    was never registered, a manager state of the wrong type. These abort
//!    loudly through [`raise!`].
//!
//! Fallible setup paths (manager registration, host bootstrapping) return
//! `Result<_, Exception>` instead of raising.
//!
//! # Exception Groups
//!
//! - [`BadArg`]: A value of the wrong type crossed a runtime boundary
//! - [`SysCap`]: System capacity exhausted (pid space, etc.)
//! - [`SysInv`]: Invalid system state or operation
//!
//! [`Task`]: crate::core::Task
//! [`Task::on_error`]: crate::core::Task::on_error
//! [`Term`]: crate::core::Term
//! [`BadArg`]: ExceptionGroup::BadArg
//! [`SysCap`]: ExceptionGroup::SysCap
//! [`SysInv`]: ExceptionGroup::SysInv
//!
//! [`raise!`]: crate::raise!

mod exception;
mod exception_class;
mod exception_group;

pub use self::exception::Exception;
pub use self::exception_class::ExceptionClass;
pub use self::exception_group::ExceptionGroup;

// -----------------------------------------------------------------------------
// raise!
// -----------------------------------------------------------------------------

/// Raises an exception with the specified class, group, and message.
///
/// This macro constructs an [`Exception`] and immediately panics. It is
/// reserved for contract violations; expected failures belong in
/// [`Task::fail`].
///
/// # Examples
///
/// ```
/// # use errand::raise;
/// fn lookup(home: &str) {
///   if home.is_empty() {
///     raise!(Error, BadArg, "home cannot be empty");
///   }
/// }
/// ```
///
/// [`Task::fail`]: crate::core::Task::fail
#[macro_export]
macro_rules! raise {
  ($class:ident, $group:ident, $error:expr $(,)?) => {
    ::std::panic!(
      "{}",
      $crate::error::Exception::new(
        $crate::error::ExceptionClass::$class,
        $crate::error::ExceptionGroup::$group,
        $error,
      ),
    )
  };
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
