use core::cmp::Ordering;

use crate::{
    id::MAX_SEQUENCE,
    time::{TimeSource, spin_until_next_millis},
};

/// Outcome of one allocation attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Allocation {
    /// A `(timestamp, sequence)` pair was reserved.
    ///
    /// `exhausted` is set when the millisecond ran out of sequence numbers and
    /// the allocator had to wait for the next one.
    Ready {
        timestamp: u64,
        sequence: u64,
        exhausted: bool,
    },
    /// The reading is older than the last issued timestamp. Nothing changed.
    Behind { last_timestamp: u64, drift_ms: u64 },
}

/// The `(last_timestamp, sequence)` pair of a worker.
///
/// Both fields are only ever read or written together, behind the worker's
/// lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SequenceState {
    /// `None` until the first ID is issued, so the first reading always counts
    /// as a new millisecond.
    last_timestamp: Option<u64>,
    sequence: u64,
    baseline: u64,
}

impl SequenceState {
    pub(crate) const fn new(baseline: u64) -> Self {
        Self {
            last_timestamp: None,
            sequence: baseline,
            baseline,
        }
    }

    #[cfg(test)]
    pub(crate) const fn with_last(last_timestamp: u64, sequence: u64, baseline: u64) -> Self {
        Self {
            last_timestamp: Some(last_timestamp),
            sequence,
            baseline,
        }
    }

    /// Reserves the next pair for a clock reading of `now`.
    ///
    /// When all 4096 sequence values of `now` are spent this spins on `time`
    /// until the next millisecond and issues the baseline there.
    pub(crate) fn allocate<T>(&mut self, now: u64, time: &T) -> Allocation
    where
        T: TimeSource + ?Sized,
    {
        let Some(last_timestamp) = self.last_timestamp else {
            return self.rollover_to(now);
        };

        match now.cmp(&last_timestamp) {
            Ordering::Greater => self.rollover_to(now),
            Ordering::Equal => {
                let next = (self.sequence + 1) & MAX_SEQUENCE;
                if next == self.baseline {
                    let timestamp = spin_until_next_millis(time, last_timestamp);
                    self.last_timestamp = Some(timestamp);
                    self.sequence = self.baseline;
                    Allocation::Ready {
                        timestamp,
                        sequence: self.baseline,
                        exhausted: true,
                    }
                } else {
                    self.sequence = next;
                    Allocation::Ready {
                        timestamp: last_timestamp,
                        sequence: next,
                        exhausted: false,
                    }
                }
            }
            Ordering::Less => Allocation::Behind {
                last_timestamp,
                drift_ms: last_timestamp - now,
            },
        }
    }

    fn rollover_to(&mut self, timestamp: u64) -> Allocation {
        self.last_timestamp = Some(timestamp);
        self.sequence = self.baseline;
        Allocation::Ready {
            timestamp,
            sequence: self.baseline,
            exhausted: false,
        }
    }
}
