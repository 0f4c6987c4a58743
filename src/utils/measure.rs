//! Wall-clock timing for tick logging.

use std::time::Duration;
use std::time::Instant;

/// Runs `f`, returning its output and the elapsed wall time.
#[inline(always)]
pub(crate) fn measure_fn<F, R>(f: F) -> (R, Duration)
where
  F: FnOnce() -> R,
{
  let instant: Instant = Instant::now();
  let output: R = f();

  (output, instant.elapsed())
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use crate::utils::measure_fn;

  #[test]
  fn test_measure_fn_returns_output() {
    let (output, elapsed): (u32, Duration) = measure_fn(|| 2 + 2);

    assert_eq!(output, 4);
    assert!(elapsed < Duration::from_secs(60));
  }
}
