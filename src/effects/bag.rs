//! Declarative effect trees.
//!
//! An application describes the commands and subscriptions it wants for one
//! update cycle as a tree of leaves addressed to managers. Leaves may be
//! wrapped in taggers that turn the values a manager produces into
//! application messages.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::core::Item;
use crate::core::Term;

// -----------------------------------------------------------------------------
// Home
// -----------------------------------------------------------------------------

/// The name an effect manager is registered under.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Home(&'static str);

impl Home {
  #[inline]
  pub const fn new(name: &'static str) -> Self {
    Self(name)
  }

  #[inline]
  pub const fn as_str(&self) -> &'static str {
    self.0
  }
}

impl Debug for Home {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    Display::fmt(self, f)
  }
}

impl Display for Home {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    write!(f, "@{}", self.0)
  }
}

// -----------------------------------------------------------------------------
// Tagger
// -----------------------------------------------------------------------------

/// A shared function from manager-produced values to application messages.
#[derive(Clone)]
pub struct Tagger {
  inner: Rc<dyn Fn(Term) -> Term>,
}

impl Tagger {
  #[inline]
  pub fn new<F>(f: F) -> Self
  where
    F: Fn(Term) -> Term + 'static,
  {
    Self { inner: Rc::new(f) }
  }

  /// Creates a tagger from a typed function.
  ///
  /// Applying it to a term that does not hold an `A` raises `BadArg`.
  pub fn typed<A, B, F>(f: F) -> Self
  where
    A: Item,
    B: Item,
    F: Fn(A) -> B + 'static,
  {
    Self::new(move |term: Term| Term::new(f(term.coerce::<A>())))
  }

  #[inline]
  pub fn apply(&self, term: Term) -> Term {
    (self.inner)(term)
  }
}

impl Debug for Tagger {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.write_str("Tagger(..)")
  }
}

// -----------------------------------------------------------------------------
// Taggers
// -----------------------------------------------------------------------------

/// The chain of taggers accumulated on the way down to a leaf.
///
/// Persistent: pushing shares the existing chain. The most recently pushed
/// (innermost) tagger is applied first.
#[derive(Clone, Default)]
pub struct Taggers {
  head: Option<Rc<Link>>,
}

struct Link {
  tagger: Tagger,
  next: Option<Rc<Link>>,
}

impl Taggers {
  #[inline]
  pub const fn new() -> Self {
    Self { head: None }
  }

  /// Returns a chain with `tagger` inside every tagger of `self`.
  #[inline]
  pub fn push(&self, tagger: Tagger) -> Self {
    Self {
      head: Some(Rc::new(Link {
        tagger,
        next: self.head.clone(),
      })),
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  pub fn len(&self) -> usize {
    self.iter().count()
  }

  /// Applies every tagger to `term`, innermost first.
  pub fn apply(&self, term: Term) -> Term {
    self.iter().fold(term, |term, tagger| tagger.apply(term))
  }

  fn iter(&self) -> impl Iterator<Item = &Tagger> {
    let mut link: Option<&Rc<Link>> = self.head.as_ref();

    std::iter::from_fn(move || {
      let this: &Rc<Link> = link?;
      link = this.next.as_ref();
      Some(&this.tagger)
    })
  }
}

impl Debug for Taggers {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_struct("Taggers").field("len", &self.len()).finish()
  }
}

// -----------------------------------------------------------------------------
// Bag
// -----------------------------------------------------------------------------

/// An untyped tree of effect descriptions.
pub enum Bag {
  /// A single effect value addressed to the manager at `home`.
  Leaf { home: Home, value: Term },
  /// A batch of bags.
  Node(Vec<Bag>),
  /// A bag whose produced values pass through `tagger`.
  Map { tagger: Tagger, inner: Box<Bag> },
}

impl Bag {
  /// Returns the number of leaves in this bag.
  pub fn leaves(&self) -> usize {
    match self {
      Self::Leaf { .. } => 1,
      Self::Node(children) => children.iter().map(Self::leaves).sum(),
      Self::Map { inner, .. } => inner.leaves(),
    }
  }
}

impl Debug for Bag {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Self::Leaf { home, value } => f
        .debug_struct("Leaf")
        .field("home", home)
        .field("value", value)
        .finish(),
      Self::Node(children) => f.debug_tuple("Node").field(children).finish(),
      Self::Map { inner, .. } => f.debug_tuple("Map").field(inner).finish_non_exhaustive(),
    }
  }
}

// -----------------------------------------------------------------------------
// Cmd / Sub
// -----------------------------------------------------------------------------

macro_rules! effect_bag {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    pub struct $name<M> {
      bag: Bag,
      marker: PhantomData<fn() -> M>,
    }

    impl<M> $name<M> {
      #[inline]
      pub(crate) const fn from_bag(bag: Bag) -> Self {
        Self {
          bag,
          marker: PhantomData,
        }
      }

      /// Returns an empty batch.
      #[inline]
      pub fn none() -> Self {
        Self::from_bag(Bag::Node(Vec::new()))
      }

      /// Returns a single effect addressed to the manager at `home`.
      #[inline]
      pub fn leaf<T>(home: Home, value: T) -> Self
      where
        T: Item,
      {
        Self::from_bag(Bag::Leaf {
          home,
          value: Term::new(value),
        })
      }

      /// Combines several effects into one.
      pub fn batch<I>(items: I) -> Self
      where
        I: IntoIterator<Item = Self>,
      {
        Self::from_bag(Bag::Node(items.into_iter().map(Self::into_bag).collect()))
      }

      /// Transforms the messages produced by this effect.
      #[inline]
      pub fn map<N, F>(self, f: F) -> $name<N>
      where
        M: Item,
        N: Item,
        F: Fn(M) -> N + 'static,
      {
        self.map_term(Tagger::typed(f))
      }

      /// Transforms the messages produced by this effect with an untyped
      /// tagger.
      #[inline]
      pub fn map_term<N>(self, tagger: Tagger) -> $name<N> {
        $name::from_bag(Bag::Map {
          tagger,
          inner: Box::new(self.bag),
        })
      }

      #[inline]
      pub fn as_bag(&self) -> &Bag {
        &self.bag
      }

      #[inline]
      pub fn into_bag(self) -> Bag {
        self.bag
      }
    }

    impl<M> Default for $name<M> {
      #[inline]
      fn default() -> Self {
        Self::none()
      }
    }

    impl<M> Debug for $name<M> {
      fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.debug_tuple(stringify!($name)).field(&self.bag).finish()
      }
    }
  };
}

effect_bag! {
  /// One-shot effects to perform now, producing messages of type `M`.
  Cmd
}

effect_bag! {
  /// Ongoing effect sources currently desired, producing messages of type
  /// `M`.
  Sub
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use crate::core::Term;
  use crate::effects::Bag;
  use crate::effects::Cmd;
  use crate::effects::Home;
  use crate::effects::Tagger;
  use crate::effects::Taggers;

  const HOME: Home = Home::new("Test");

  #[test]
  fn test_home_display() {
    assert_eq!(HOME.to_string(), "@Test");
    assert_eq!(HOME.as_str(), "Test");
  }

  #[test]
  fn test_taggers_apply_innermost_first() {
    let chain: Taggers = Taggers::new()
      .push(Tagger::typed(|x: i32| x * 10))
      .push(Tagger::typed(|x: i32| x + 1));

    assert_eq!(chain.len(), 2);
    assert_eq!(chain.apply(Term::new(1_i32)).coerce::<i32>(), 20);
  }

  #[test]
  fn test_taggers_share_tail() {
    let base: Taggers = Taggers::new().push(Tagger::typed(|x: i32| x * 2));
    let left: Taggers = base.push(Tagger::typed(|x: i32| x + 1));
    let right: Taggers = base.push(Tagger::typed(|x: i32| x - 1));

    assert_eq!(left.apply(Term::new(5_i32)).coerce::<i32>(), 12);
    assert_eq!(right.apply(Term::new(5_i32)).coerce::<i32>(), 8);
    assert_eq!(base.len(), 1);
  }

  #[test]
  fn test_empty_taggers_are_identity() {
    assert!(Taggers::default().is_empty());
    assert_eq!(Taggers::new().apply(Term::new("x")).coerce::<&str>(), "x");
  }

  #[test]
  fn test_batch_counts_leaves() {
    let cmd: Cmd<i32> = Cmd::batch([
      Cmd::leaf(HOME, 1_u8),
      Cmd::none(),
      Cmd::batch([Cmd::leaf(HOME, 2_u8), Cmd::leaf(HOME, 3_u8)]),
    ]);

    assert_eq!(cmd.as_bag().leaves(), 3);
  }

  #[test]
  fn test_map_wraps_bag() {
    let cmd: Cmd<String> = Cmd::<i32>::leaf(HOME, 1_u8).map(|x: i32| x.to_string());

    assert!(matches!(cmd.into_bag(), Bag::Map { .. }));
  }
}
