/// A result type defaulting to this crate's [`enum@Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors a [`SnowflakeWorker`] can report.
///
/// Every failure is returned as a value; generation never panics and never
/// hands out an ID that could collide with or sort before one already issued.
///
/// [`SnowflakeWorker`]: crate::SnowflakeWorker
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker ID does not fit the 10-bit worker field.
    ///
    /// Raised at construction only; the worker is never created.
    #[error("worker id {worker_id} is out of range (must be between 0 and {max})")]
    InvalidWorkerId {
        /// The rejected worker ID.
        worker_id: i64,
        /// The largest accepted worker ID.
        max: u64,
    },

    /// The clock reads earlier than the timestamp of the last issued ID.
    ///
    /// The worker state is left untouched, so retrying once the clock has
    /// caught up succeeds.
    #[error("clock moved backwards by {drift_ms}ms")]
    ClockMovedBackward {
        /// How far behind the last issued timestamp the clock is.
        drift_ms: u64,
    },

    /// The worker lock was poisoned by a panicking thread.
    ///
    /// Only reachable with the std mutex; `parking-lot` mutexes do not poison.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("worker lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};

// Convert all poisoned lock errors to a simplified `LockPoisoned`
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
