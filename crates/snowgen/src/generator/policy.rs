use crate::id::MAX_SEQUENCE;

/// How a worker reacts when the clock reads earlier than the timestamp of the
/// last ID it issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClockPolicy {
    /// Return [`Error::ClockMovedBackward`] immediately.
    ///
    /// [`Error::ClockMovedBackward`]: crate::Error::ClockMovedBackward
    #[default]
    FailFast,

    /// Spin until the clock catches up when it is at most this many
    /// milliseconds behind; larger regressions still fail fast.
    ///
    /// The wait ends with [`Error::ClockMovedBackward`] if the clock falls
    /// further behind than the bound or has not caught up after that many
    /// milliseconds of real time. The calling thread holds the worker lock
    /// while it waits, so other callers on the same worker block for up to the
    /// same bound.
    ///
    /// [`Error::ClockMovedBackward`]: crate::Error::ClockMovedBackward
    WaitUpTo(u64),
}

impl ClockPolicy {
    /// Largest regression, in milliseconds, this policy waits out.
    pub(crate) const fn max_drift_ms(self) -> u64 {
        match self {
            Self::FailFast => 0,
            Self::WaitUpTo(max_drift_ms) => max_drift_ms,
        }
    }

    pub(crate) const fn tolerates(self, drift_ms: u64) -> bool {
        match self {
            Self::FailFast => false,
            Self::WaitUpTo(max_drift_ms) => drift_ms <= max_drift_ms,
        }
    }
}

/// The sequence value a worker issues first in every millisecond.
///
/// The baseline is fixed when the worker is built. Any baseline keeps IDs
/// unique; only [`SequenceStart::Zero`] keeps IDs issued within one
/// millisecond strictly increasing, since a non-zero baseline wraps from 4095
/// back to 0 before the millisecond is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SequenceStart {
    /// Start every millisecond at sequence 0.
    #[default]
    Zero,

    /// Start every millisecond at the given value, masked to 12 bits.
    Fixed(u64),

    /// Start every millisecond at a value drawn once per worker from the
    /// thread-local RNG.
    ///
    /// Lowers the odds that a restarted process reusing a worker ID within
    /// the same millisecond repeats an earlier ID. It is not a guarantee.
    #[cfg_attr(docsrs, doc(cfg(feature = "random-baseline")))]
    #[cfg(feature = "random-baseline")]
    Random,
}

impl SequenceStart {
    pub(crate) fn resolve(self) -> u64 {
        match self {
            Self::Zero => 0,
            Self::Fixed(start) => start & MAX_SEQUENCE,
            #[cfg(feature = "random-baseline")]
            Self::Random => rand::random::<u64>() & MAX_SEQUENCE,
        }
    }
}
