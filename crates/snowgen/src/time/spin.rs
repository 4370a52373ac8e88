use std::time::{Duration, Instant};

use crate::time::TimeSource;

/// Busy-polls `time` until it reads at least `target`, returning that reading.
///
/// Has no deadline of its own; callers only use it to cross into the next
/// millisecond after the sequence space is exhausted.
pub fn spin_until_millis<T>(time: &T, target: u64) -> u64
where
    T: TimeSource + ?Sized,
{
    loop {
        let now = time.current_millis();
        if now >= target {
            break now;
        }
        core::hint::spin_loop();
    }
}

/// Busy-polls `time` until it reads strictly later than `last_timestamp`.
pub fn spin_until_next_millis<T>(time: &T, last_timestamp: u64) -> u64
where
    T: TimeSource + ?Sized,
{
    spin_until_millis(time, last_timestamp.saturating_add(1))
}

/// Busy-polls `time` until it reads at least `target`, giving up once the
/// reading is more than `max_drift_ms` behind `target` or `max_drift_ms` of
/// real time has passed.
///
/// Returns the caught-up reading, or the drift at the last reading when the
/// wait gives up.
pub fn spin_until_caught_up<T>(time: &T, target: u64, max_drift_ms: u64) -> Result<u64, u64>
where
    T: TimeSource + ?Sized,
{
    let started = Instant::now();
    let deadline = Duration::from_millis(max_drift_ms);
    loop {
        let now = time.current_millis();
        if now >= target {
            break Ok(now);
        }
        let drift_ms = target - now;
        if drift_ms > max_drift_ms || started.elapsed() > deadline {
            break Err(drift_ms);
        }
        core::hint::spin_loop();
    }
}
