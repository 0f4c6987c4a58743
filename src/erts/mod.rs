//! Core "erts" types of the Errand runtime system.

mod host;
mod manual_host;
mod process;
mod runtime;
mod scheduler;
mod tokio_host;

pub(crate) use self::runtime::WeakRuntime;

pub use self::host::Host;
pub use self::manual_host::ManualHost;
pub use self::process::Process;
pub use self::runtime::Runtime;
pub use self::runtime::RuntimeConfig;
pub use self::tokio_host::TokioHost;
