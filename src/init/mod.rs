//! Runtime entry point on a tokio current-thread runtime.
//!
//! [`block_on`] builds a current-thread tokio runtime and a [`LocalSet`],
//! creates a [`Runtime`] backed by [`TokioHost`], and drives the future
//! returned by `main` to completion.
//!
//! [`LocalSet`]: tokio::task::LocalSet

use std::fmt::Display;
use std::sync::Once;
use std::time::Instant;
use tokio::runtime::Builder;
use tokio::runtime::Runtime as TokioRuntime;
use tokio::task::LocalSet;
use tracing::Level;
use tracing::Span;
use tracing::debug;
use tracing::span;

use crate::error::Exception;
use crate::error::ExceptionClass;
use crate::error::ExceptionGroup;
use crate::erts::Runtime;
use crate::erts::RuntimeConfig;
use crate::erts::TokioHost;

static TRACING: Once = Once::new();

/// Runs the future returned by `main` to completion.
///
/// `main` is called from inside the `LocalSet`, so it may spawn processes
/// before its future is first polled. Processes still alive when the future
/// completes are dropped with the runtime.
///
/// The first call also installs the global tracing subscriber when the
/// `tracing` feature is enabled.
pub fn block_on<F, Fut>(config: RuntimeConfig, main: F) -> Result<Fut::Output, Exception>
where
  F: FnOnce(Runtime) -> Fut,
  Fut: Future,
{
  TRACING.call_once(|| {
    if let Err(error) = init_tracing_subscriber(&config) {
      eprintln!("failed to set tracing subscriber:");
      eprintln!("    {}", error.error());
    }
  });

  let span: Span = span!(target: "errand", Level::DEBUG, "init::block_on");
  let tokio: TokioRuntime = build_tokio_runtime(&config)?;
  let local: LocalSet = LocalSet::new();

  debug!(target: "errand", parent: &span, "initializing");

  let instant: Instant = Instant::now();

  let output: Fut::Output = local.block_on(&tokio, async move {
    main(Runtime::new(config, TokioHost::new())).await
  });

  debug!(target: "errand", parent: &span, elapsed = ?instant.elapsed(), "exiting");

  Ok(output)
}

/// Builds the global tracing subscriber configuration.
#[cfg(feature = "tracing")]
fn init_tracing_subscriber(config: &RuntimeConfig) -> Result<(), Exception> {
  use tracing_subscriber::FmtSubscriber;
  use tracing_subscriber::fmt::format;
  use tracing_subscriber::util::SubscriberInitExt;

  FmtSubscriber::builder()
    .event_format(format().compact())
    .log_internal_errors(true)
    .with_ansi(true)
    .with_file(config.tracing_source_file)
    .with_level(true)
    .with_line_number(config.tracing_source_line)
    .with_max_level(config.tracing_filter())
    .with_target(config.tracing_source_name)
    .finish()
    .try_init()
    .map_err(error)
}

#[cfg(not(feature = "tracing"))]
fn init_tracing_subscriber(_config: &RuntimeConfig) -> Result<(), Exception> {
  Ok(())
}

/// Builds the tokio current-thread runtime with the given configuration.
fn build_tokio_runtime(config: &RuntimeConfig) -> Result<TokioRuntime, Exception> {
  Builder::new_current_thread()
    .enable_time()
    .event_interval(config.rt_event_interval)
    .global_queue_interval(config.rt_global_queue_interval)
    .max_blocking_threads(config.rt_max_blocking_threads)
    .thread_keep_alive(config.rt_thread_keep_alive)
    .build()
    .map_err(error)
}

/// Returns a generic `SysInv` exception with the given error message.
#[cold]
fn error<E>(error: E) -> Exception
where
  E: Display,
{
  Exception::new(ExceptionClass::Error, ExceptionGroup::SysInv, error)
}
