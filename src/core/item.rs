//! Trait defining type-erased runtime values usable within [`Term`].
//!
//! [`Term`]: crate::core::Term

use std::any::Any;
use std::fmt::Debug;

/// Trait implemented by all values stored inside a [`Term`].
///
/// # Automatic Implementation
///
/// [`Item`] is automatically implemented for all types that satisfy:
///
/// - [`Any`]: Required for downcasting
/// - [`Debug`]: Required for diagnostic output
/// - `'static`: Required for type erasure
///
/// The runtime is single-threaded, so neither [`Send`] nor [`Sync`] is
/// required and values may hold `Rc` handles or closures.
///
/// # Examples
///
/// ```
/// use errand::core::Term;
///
/// // These types automatically implement Item:
/// let t1 = Term::new(42_i32);
/// let t2 = Term::new(String::from("hello"));
/// let t3 = Term::new(vec![1, 2, 3]);
/// ```
///
/// [`Term`]: crate::core::Term
pub trait Item: Any + Debug + 'static {
  /// Returns a shared reference to this value as [`Any`].
  fn as_any(&self) -> &dyn Any;

  /// Returns a mutable reference to this value as [`Any`].
  fn as_mut_any(&mut self) -> &mut dyn Any;

  /// Converts this value into a boxed [`Any`] trait object.
  fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> Item for T
where
  T: Any + Debug + 'static,
{
  #[inline]
  fn as_any(&self) -> &dyn Any {
    self
  }

  #[inline]
  fn as_mut_any(&mut self) -> &mut dyn Any {
    self
  }

  #[inline]
  fn into_any(self: Box<Self>) -> Box<dyn Any> {
    self
  }
}
