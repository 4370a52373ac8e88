use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::time::{TWITTER_EPOCH, TimeSource};

/// A wall-clock time source offset from a fixed epoch.
///
/// Every reading goes through `SystemTime::now()`, so it follows NTP steps and
/// manual adjustments, including backwards ones. Readings taken before the
/// epoch saturate at zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SystemClock {
    epoch_millis: u64,
}

impl Default for SystemClock {
    /// Constructs a system clock aligned to [`TWITTER_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(TWITTER_EPOCH)
    }
}

impl SystemClock {
    /// Constructs a system clock whose zero point is `epoch`, given as a
    /// [`Duration`] since 1970-01-01 UTC.
    ///
    /// # Example
    ///
    /// ```
    /// use snowgen::{SystemClock, TimeSource, TWITTER_EPOCH};
    ///
    /// let twitter = SystemClock::with_epoch(TWITTER_EPOCH);
    /// let unix = SystemClock::with_epoch(std::time::Duration::ZERO);
    ///
    /// let offset = unix.current_millis() - twitter.current_millis();
    /// assert!(offset >= 1_288_834_974_657);
    /// ```
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_millis: epoch.as_millis() as u64,
        }
    }

    /// The zero point of this clock as a [`Duration`] since the UNIX epoch.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch_millis)
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        let unix_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
            });
        unix_millis.saturating_sub(self.epoch_millis)
    }
}
