//! Errand - A cooperative, single-threaded task runtime.
//!
//! Errand runs inert [`Task`] descriptions as lightweight processes with
//! FIFO mailboxes, steps them round-robin against a bounded budget per
//! host tick, and wires declarative per-update effect descriptions to
//! long-lived effect manager processes.
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//!
//! use errand::core::{Task, Term};
//! use errand::erts::{ManualHost, Process, Runtime, RuntimeConfig};
//!
//! let host = ManualHost::new();
//! let runtime = Runtime::new(RuntimeConfig::new(), host.clone());
//!
//! let pid = runtime.raw_spawn(
//!   Process::sleep(Duration::from_millis(10))
//!     .and_then(|_| Task::receive(|message: Term| Task::succeed(message))),
//! );
//!
//! runtime.raw_send(pid, Term::new("hello"));
//! host.run_until_idle();
//! assert!(runtime.alive(pid));
//!
//! host.advance(Duration::from_millis(10));
//! assert!(!runtime.alive(pid));
//! ```
//!
//! # Core Modules
//!
//! - [`init`]: Tokio-backed entry point
//! - [`erts`]: Runtime, scheduler hosts, and the process API
//! - [`core`]: Core types (tasks, terms, pids, bindings)
//! - [`effects`]: Effect bags and effect managers
//! - [`program`]: Applications driven by effect managers
//! - [`error`]: Exception system
//! - [`consts`]: Runtime configuration constants
//!
//! [`Task`]: crate::core::Task

mod proc;
mod utils;

pub mod consts;
pub mod core;
pub mod effects;
pub mod error;
pub mod erts;
pub mod init;
pub mod program;
