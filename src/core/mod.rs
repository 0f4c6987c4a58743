//! Core value and task types.
//!
//! - [`Term`] / [`Item`]: type-erased values carried by tasks and messages
//! - [`Pid`]: process identifiers
//! - [`Task`]: inert descriptions of work, with [`Callback`] continuations
//! - [`Complete`] / [`Cancel`]: the two halves of a native binding

mod binding;
mod item;
mod pid;
mod task;
mod term;

pub use self::binding::Cancel;
pub use self::binding::Complete;
pub use self::item::Item;
pub use self::pid::Pid;
pub use self::task::Binding;
pub use self::task::Callback;
pub use self::task::Task;
pub use self::term::Term;
