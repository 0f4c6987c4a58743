//! Type-erased runtime value container.
//!
//! [`Term`] carries every value that flows through the runtime: task
//! results and errors, mailbox messages, manager states, and effect values.
//! The concrete type is erased at the [`Term`] boundary and recovered with
//! the downcasting methods.
//!
//! # Examples
//!
//! ```
//! use errand::core::Term;
//!
//! let num = Term::new(42_i32);
//!
//! assert_eq!(num.downcast_ref::<i32>(), Some(&42));
//! assert_eq!(num.downcast_ref::<String>(), None);
//! assert_eq!(num.coerce::<i32>(), 42);
//! ```

use std::any::Any;
use std::any::type_name;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;

use crate::core::Item;
use crate::raise;

/// Dynamically typed value passed between tasks and processes.
#[repr(transparent)]
pub struct Term {
  data: Box<dyn Item>,
}

impl Term {
  /// Creates a new term wrapping the given value.
  ///
  /// Wrapping a `Term` returns it unchanged, so generic `T: Item` APIs
  /// accept already-erased values.
  #[inline]
  pub fn new<T>(data: T) -> Self
  where
    T: Item,
  {
    let mut slot: Option<T> = Some(data);

    if let Some(term) = (&mut slot as &mut dyn Any).downcast_mut::<Option<Term>>() {
      if let Some(term) = term.take() {
        return term;
      }
    }

    match slot {
      Some(data) => Self {
        data: Box::new(data),
      },
      None => unreachable!(),
    }
  }

  /// Creates a term holding the unit value.
  #[inline]
  pub fn unit() -> Self {
    Self::new(())
  }

  /// Returns `true` if the contained value is of type `T`.
  ///
  /// # Examples
  ///
  /// ```
  /// use errand::core::Term;
  ///
  /// let term = Term::new(42_i32);
  ///
  /// assert!(term.is::<i32>());
  /// assert!(!term.is::<String>());
  /// ```
  #[inline]
  pub fn is<T>(&self) -> bool
  where
    T: 'static,
  {
    (*self.data).as_any().is::<T>()
  }

  /// Returns a shared reference to the contained value of type `T`.
  ///
  /// Returns [`None`] if the value has a different concrete type.
  #[inline]
  pub fn downcast_ref<T>(&self) -> Option<&T>
  where
    T: 'static,
  {
    (*self.data).as_any().downcast_ref()
  }

  /// Returns a mutable reference to the contained value of type `T`.
  ///
  /// Returns [`None`] if the value has a different concrete type.
  #[inline]
  pub fn downcast_mut<T>(&mut self) -> Option<&mut T>
  where
    T: 'static,
  {
    (*self.data).as_mut_any().downcast_mut()
  }

  /// Extracts the contained value of type `T`.
  ///
  /// Returns the original term unchanged if the value has a different
  /// concrete type.
  ///
  /// # Examples
  ///
  /// ```
  /// use errand::core::Term;
  ///
  /// let term = Term::new(String::from("hello"));
  /// let term = term.downcast::<i32>().unwrap_err();
  ///
  /// assert_eq!(term.downcast::<String>().unwrap(), "hello");
  /// ```
  pub fn downcast<T>(self) -> std::result::Result<T, Self>
  where
    T: 'static,
  {
    if !self.is::<T>() {
      return Err(self);
    }

    match self.data.into_any().downcast::<T>() {
      Ok(data) => Ok(*data),
      Err(_) => unreachable!(),
    }
  }

  /// Extracts the contained value of type `T`.
  ///
  /// # Errors
  ///
  /// Raises a [`BadArg`] exception if the value has a different concrete
  /// type. Use this where the type is part of an embedding contract, e.g.
  /// an application message or a manager state.
  ///
  /// [`BadArg`]: crate::error::ExceptionGroup::BadArg
  #[track_caller]
  pub fn coerce<T>(self) -> T
  where
    T: 'static,
  {
    match self.downcast::<T>() {
      Ok(data) => data,
      Err(term) => raise!(
        Error,
        BadArg,
        format!("expected `{}`, found {term:?}", type_name::<T>()),
      ),
    }
  }
}

impl Debug for Term {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Debug::fmt(&*self.data, f)
  }
}

impl Display for Term {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Debug::fmt(&*self.data, f)
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::panic;

  use crate::core::Term;

  #[test]
  fn test_is() {
    let term: Term = Term::new(1_u8);

    assert!(term.is::<u8>());
    assert!(!term.is::<u16>());
  }

  #[test]
  fn test_downcast_mut() {
    let mut term: Term = Term::new(vec![1, 2, 3]);

    if let Some(data) = term.downcast_mut::<Vec<i32>>() {
      data.push(4);
    }

    assert_eq!(term.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3, 4]));
  }

  #[test]
  fn test_downcast_mismatch_returns_term() {
    let term: Term = Term::new("text");
    let term: Term = term.downcast::<u32>().unwrap_err();

    assert_eq!(term.downcast::<&str>().unwrap(), "text");
  }

  #[test]
  fn test_coerce() {
    assert_eq!(Term::new(7_i64).coerce::<i64>(), 7);
  }

  #[test]
  fn test_coerce_mismatch_raises() {
    assert!(panic::catch_unwind(|| Term::new(7_i64).coerce::<String>()).is_err());
  }

  #[test]
  fn test_new_does_not_nest_terms() {
    let term: Term = Term::new(Term::new(5_u16));

    assert!(term.is::<u16>());
    assert!(!term.is::<Term>());
  }

  #[test]
  fn test_unit() {
    assert!(Term::unit().is::<()>());
  }

  #[test]
  fn test_display_equals_debug() {
    let term: Term = Term::new(Some(3));

    assert_eq!(format!("{term}"), "Some(3)");
    assert_eq!(format!("{term:?}"), "Some(3)");
  }
}
