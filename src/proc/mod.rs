//! Internal process state and the task-stepping state machine.
//!
//! A process is a task root, a stack of pending continuation frames, and a
//! FIFO mailbox. These types are owned by the scheduler and never exposed to
//! user code; the public surface is [`Runtime`] and [`Process`].
//!
//! [`Runtime`]: crate::erts::Runtime
//! [`Process`]: crate::erts::Process

mod proc_data;
mod proc_step;

pub(crate) use self::proc_data::Frame;
pub(crate) use self::proc_data::ProcData;
pub(crate) use self::proc_data::ProcHandle;
pub(crate) use self::proc_data::Root;
pub(crate) use self::proc_step::Outcome;
pub(crate) use self::proc_step::step;
