use core::time::Duration;
use std::sync::Arc;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
///
/// The 41-bit timestamp field counts milliseconds from this point and lasts
/// roughly 69 years.
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// A source of milliseconds elapsed since a fixed epoch.
///
/// This abstraction allows you to plug in the system wall clock or a mocked
/// time source in tests. Readings may go backwards; the worker detects and
/// reports that instead of trusting them.
///
/// # Example
///
/// ```
/// use snowgen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
