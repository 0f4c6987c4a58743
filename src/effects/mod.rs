//! Effect managers and the effect bags that drive them.
//!
//! An application never performs effects directly. Each update returns a
//! [`Cmd`] and the current [`Sub`]; the program [`gather`]s both into one
//! [`Effects`] message per registered [`EffectManager`], and each manager
//! turns the declarative description into actual work.
//!
//! # Contents
//!
//! - Effect trees: [`Home`], [`Bag`], [`Cmd`], [`Sub`], [`Tagger`], [`Taggers`]
//! - Manager protocol: [`EffectManager`], [`ManagerKind`], [`ManagerMsg`], [`Router`]
//! - Registration: [`ManagerTable`]
//! - Built-in managers: [`TaskManager`]

mod bag;
mod gather;
mod manager;
mod router;
mod table;
mod task;

pub(crate) use self::gather::dispatch;
pub(crate) use self::manager::DynManager;
pub(crate) use self::manager::manager_task;

pub use self::bag::Bag;
pub use self::bag::Cmd;
pub use self::bag::Home;
pub use self::bag::Sub;
pub use self::bag::Tagger;
pub use self::bag::Taggers;
pub use self::gather::gather;
pub use self::manager::EffectManager;
pub use self::manager::Effects;
pub use self::manager::ManagerKind;
pub use self::manager::ManagerMsg;
pub use self::router::Router;
pub use self::table::ManagerTable;
pub use self::task::TaskManager;
