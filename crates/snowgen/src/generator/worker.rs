#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    error::{Error, Result},
    generator::{
        ClockPolicy, Mutex, MutexGuard, WorkerBuilder,
        state::{Allocation, SequenceState},
    },
    id::{MAX_WORKER_ID, SnowflakeId},
    time::{SystemClock, TimeSource, spin_until_caught_up},
};

/// A lock-based Snowflake ID generator bound to one worker ID.
///
/// The `(last_timestamp, sequence)` state lives behind a single mutex, so one
/// worker can be shared across threads (e.g. in an `Arc`) and every caller
/// gets a distinct ID. Separate workers share nothing.
///
/// ## Guarantees
/// - IDs from one worker never repeat within a process lifetime.
/// - While the clock does not regress, IDs from one worker strictly increase
///   in the order calls acquire the lock (with the default
///   [`SequenceStart::Zero`]).
/// - At most 4096 IDs are issued per millisecond; the 4097th caller spins
///   until the clock reaches the next millisecond.
///
/// IDs from different workers are only distinct if their worker IDs are.
///
/// [`SequenceStart::Zero`]: crate::SequenceStart::Zero
pub struct SnowflakeWorker<T = SystemClock>
where
    T: TimeSource,
{
    worker_id: u64,
    policy: ClockPolicy,
    sequence_start: u64,
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<SequenceState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<SequenceState>,
    time: T,
}

impl SnowflakeWorker<SystemClock> {
    /// Creates a worker reading the system clock relative to
    /// [`TWITTER_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] when `worker_id` is negative or
    /// greater than [`MAX_WORKER_ID`].
    ///
    /// # Example
    /// ```
    /// use snowgen::{Error, SnowflakeWorker};
    ///
    /// assert!(SnowflakeWorker::new(0).is_ok());
    /// assert!(SnowflakeWorker::new(1023).is_ok());
    /// assert!(matches!(
    ///     SnowflakeWorker::new(1024),
    ///     Err(Error::InvalidWorkerId { worker_id: 1024, max: 1023 })
    /// ));
    /// ```
    ///
    /// [`TWITTER_EPOCH`]: crate::TWITTER_EPOCH
    pub fn new(worker_id: i64) -> Result<Self> {
        Self::with_clock(worker_id, SystemClock::default())
    }

    /// Starts a [`WorkerBuilder`] for the given worker ID.
    pub fn builder(worker_id: i64) -> WorkerBuilder<SystemClock> {
        WorkerBuilder::new(worker_id)
    }
}

impl<T> SnowflakeWorker<T>
where
    T: TimeSource,
{
    /// Creates a worker reading timestamps from `time`, with the default
    /// fail-fast clock policy and a zero sequence baseline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] when `worker_id` is negative or
    /// greater than [`MAX_WORKER_ID`].
    pub fn with_clock(worker_id: i64, time: T) -> Result<Self> {
        Self::from_parts(worker_id, time, ClockPolicy::default(), 0)
    }

    pub(crate) fn from_parts(
        worker_id: i64,
        time: T,
        policy: ClockPolicy,
        sequence_start: u64,
    ) -> Result<Self> {
        let worker_id = u64::try_from(worker_id)
            .ok()
            .filter(|&id| id <= MAX_WORKER_ID)
            .ok_or(Error::InvalidWorkerId {
                worker_id,
                max: MAX_WORKER_ID,
            })?;

        let state = Mutex::new(SequenceState::new(sequence_start));
        Ok(Self {
            worker_id,
            policy,
            sequence_start,
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            time,
        })
    }

    /// The worker ID embedded in every ID this worker issues.
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The sequence value issued first in every millisecond.
    pub const fn sequence_start(&self) -> u64 {
        self.sequence_start
    }

    /// How this worker reacts to a clock that moved backwards.
    pub const fn clock_policy(&self) -> ClockPolicy {
        self.policy
    }

    /// The time source this worker reads.
    pub const fn time_source(&self) -> &T {
        &self.time
    }

    /// Generates the next ID.
    ///
    /// Blocks briefly only when this millisecond's 4096 sequence values are
    /// spent, or when a [`ClockPolicy::WaitUpTo`] policy lets the clock catch
    /// up.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackward`] when the clock reads earlier than the
    ///   last issued timestamp (beyond what the policy tolerates). The worker
    ///   state is unchanged and a later call succeeds once the clock recovers.
    /// - [`Error::LockPoisoned`] if another thread panicked while holding the
    ///   lock (std mutex only).
    ///
    /// # Example
    /// ```
    /// use snowgen::{SnowflakeWorker, TimeSource};
    ///
    /// struct FixedTime;
    /// impl TimeSource for FixedTime {
    ///     fn current_millis(&self) -> u64 {
    ///         42
    ///     }
    /// }
    ///
    /// let worker = SnowflakeWorker::with_clock(3, FixedTime).unwrap();
    /// let id = worker.next_id().unwrap();
    ///
    /// assert_eq!(id.timestamp(), 42);
    /// assert_eq!(id.worker_id(), 3);
    /// assert_eq!(id.sequence(), 0);
    /// assert_eq!(worker.next_id().unwrap().sequence(), 1);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), fields(worker_id = self.worker_id)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.lock()?;

        // Read under the lock: a reading taken before it could be overtaken
        // by a caller that locked first and look like a regression.
        let now = self.time.current_millis();
        let allocation = match state.allocate(now, &self.time) {
            Allocation::Behind {
                last_timestamp,
                drift_ms,
            } if self.policy.tolerates(drift_ms) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(drift_ms, "clock behind, waiting for it to catch up");
                let max_drift_ms = self.policy.max_drift_ms();
                match spin_until_caught_up(&self.time, last_timestamp, max_drift_ms) {
                    Ok(now) => state.allocate(now, &self.time),
                    Err(drift_ms) => Allocation::Behind {
                        last_timestamp,
                        drift_ms,
                    },
                }
            }
            allocation => allocation,
        };
        drop(state);

        match allocation {
            Allocation::Ready {
                timestamp,
                sequence,
                exhausted: _exhausted,
            } => {
                #[cfg(feature = "tracing")]
                {
                    if _exhausted {
                        tracing::trace!(timestamp, "sequence exhausted, moved to next millisecond");
                    }
                }
                Ok(SnowflakeId::from_components(
                    timestamp,
                    self.worker_id,
                    sequence,
                ))
            }
            Allocation::Behind { drift_ms, .. } => Err(Self::cold_clock_behind(self.worker_id, drift_ms)),
        }
    }

    #[cold]
    #[inline(never)]
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn cold_clock_behind(worker_id: u64, drift_ms: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            worker_id,
            drift_ms,
            "clock moved backwards, refusing to generate id"
        );
        Error::ClockMovedBackward { drift_ms }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SequenceState>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }

    #[cfg(test)]
    pub(crate) fn replace_state(&self, replacement: SequenceState) {
        if let Ok(mut state) = self.lock() {
            *state = replacement;
        }
    }
}

impl<T> core::fmt::Debug for SnowflakeWorker<T>
where
    T: TimeSource + core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SnowflakeWorker")
            .field("worker_id", &self.worker_id)
            .field("policy", &self.policy)
            .field("sequence_start", &self.sequence_start)
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}
