use crate::{
    error::Result,
    generator::{ClockPolicy, SequenceStart, SnowflakeWorker},
    time::{SystemClock, TimeSource},
};

/// Configures a [`SnowflakeWorker`] before it is built.
///
/// Defaults match [`SnowflakeWorker::new`]: the system clock relative to
/// [`TWITTER_EPOCH`], [`ClockPolicy::FailFast`] and
/// [`SequenceStart::Zero`].
///
/// # Example
/// ```
/// use snowgen::{ClockPolicy, SequenceStart, SnowflakeWorker, SystemClock};
///
/// let worker = SnowflakeWorker::builder(12)
///     .clock(SystemClock::default())
///     .clock_policy(ClockPolicy::WaitUpTo(5))
///     .sequence_start(SequenceStart::Fixed(100))
///     .build()
///     .unwrap();
///
/// assert_eq!(worker.worker_id(), 12);
/// assert_eq!(worker.sequence_start(), 100);
/// assert_eq!(worker.next_id().unwrap().sequence(), 100);
/// ```
///
/// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
#[derive(Clone, Debug)]
#[must_use]
pub struct WorkerBuilder<T = SystemClock> {
    worker_id: i64,
    time: T,
    policy: ClockPolicy,
    sequence_start: SequenceStart,
}

impl WorkerBuilder<SystemClock> {
    /// Starts a builder for `worker_id` with every other setting at its
    /// default.
    pub fn new(worker_id: i64) -> Self {
        Self {
            worker_id,
            time: SystemClock::default(),
            policy: ClockPolicy::default(),
            sequence_start: SequenceStart::default(),
        }
    }
}

impl<T> WorkerBuilder<T>
where
    T: TimeSource,
{
    /// Reads timestamps from `time` instead of the system clock.
    pub fn clock<U: TimeSource>(self, time: U) -> WorkerBuilder<U> {
        WorkerBuilder {
            worker_id: self.worker_id,
            time,
            policy: self.policy,
            sequence_start: self.sequence_start,
        }
    }

    /// Sets how the worker reacts to a clock that moved backwards.
    pub fn clock_policy(mut self, policy: ClockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the sequence baseline issued first in every millisecond.
    pub fn sequence_start(mut self, start: SequenceStart) -> Self {
        self.sequence_start = start;
        self
    }

    /// Validates the worker ID and builds the worker.
    ///
    /// A [`SequenceStart::Random`] baseline is drawn here, once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] when the worker ID is negative or
    /// greater than [`MAX_WORKER_ID`].
    ///
    /// [`Error::InvalidWorkerId`]: crate::Error::InvalidWorkerId
    /// [`MAX_WORKER_ID`]: crate::MAX_WORKER_ID
    /// [`SequenceStart::Random`]: crate::SequenceStart
    pub fn build(self) -> Result<SnowflakeWorker<T>> {
        SnowflakeWorker::from_parts(
            self.worker_id,
            self.time,
            self.policy,
            self.sequence_start.resolve(),
        )
    }
}
