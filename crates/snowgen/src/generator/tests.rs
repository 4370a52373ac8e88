use crate::{
    ClockPolicy, Error, MAX_SEQUENCE, MAX_WORKER_ID, SequenceStart, SnowflakeId, SnowflakeWorker,
    SystemClock, TimeSource, generator::state::SequenceState,
};
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// A clock the test moves by hand.
#[derive(Clone, Default)]
struct ManualTime {
    millis: Arc<AtomicU64>,
}

impl ManualTime {
    fn at(millis: u64) -> Self {
        let time = Self::default();
        time.set(millis);
        time
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Reads `frozen` for the first `frozen_reads` reads, then one millisecond
/// later forever.
struct FrozenTime {
    frozen: u64,
    frozen_reads: u64,
    reads: AtomicU64,
}

impl FrozenTime {
    fn new(frozen: u64, frozen_reads: u64) -> Self {
        Self {
            frozen,
            frozen_reads,
            reads: AtomicU64::new(0),
        }
    }
}

impl TimeSource for FrozenTime {
    fn current_millis(&self) -> u64 {
        let read = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if read <= self.frozen_reads {
            self.frozen
        } else {
            self.frozen + 1
        }
    }
}

/// Replays `values` one read at a time, repeating the last one.
struct StepTime {
    values: Vec<u64>,
    index: AtomicUsize,
}

impl StepTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            values,
            index: AtomicUsize::new(0),
        }
    }
}

impl TimeSource for StepTime {
    fn current_millis(&self) -> u64 {
        let index = self.index.fetch_add(1, Ordering::SeqCst);
        self.values[index.min(self.values.len() - 1)]
    }
}

/// Advances one millisecond every 4096 reads, so it never regresses and
/// exhausts the sequence space on a regular beat.
#[derive(Default)]
struct TickEvery4096 {
    reads: AtomicU64,
}

impl TimeSource for TickEvery4096 {
    fn current_millis(&self) -> u64 {
        self.reads.fetch_add(1, Ordering::SeqCst) >> 12
    }
}

fn assert_strictly_increasing(ids: &[SnowflakeId]) {
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
    }
}

#[test]
fn accepts_worker_id_bounds() {
    assert_eq!(SnowflakeWorker::new(0).unwrap().worker_id(), 0);
    assert_eq!(
        SnowflakeWorker::new(1023).unwrap().worker_id(),
        MAX_WORKER_ID
    );
}

#[test]
fn rejects_out_of_range_worker_ids() {
    for worker_id in [-1, 1024, i64::MIN, i64::MAX] {
        assert_eq!(
            SnowflakeWorker::new(worker_id).err(),
            Some(Error::InvalidWorkerId {
                worker_id,
                max: MAX_WORKER_ID,
            })
        );
    }
    assert!(SnowflakeWorker::builder(-1).build().is_err());
    assert!(
        SnowflakeWorker::with_clock(2048, MockTime { millis: 0 }).is_err()
    );
}

#[test]
fn invalid_worker_id_message_names_range() {
    let err = SnowflakeWorker::new(-1).unwrap_err();
    assert_eq!(
        err.to_string(),
        "worker id -1 is out of range (must be between 0 and 1023)"
    );
}

#[test]
fn first_call_starts_new_millisecond_even_at_zero() {
    let worker = SnowflakeWorker::with_clock(5, MockTime { millis: 0 }).unwrap();
    let id = worker.next_id().unwrap();
    assert_eq!(id, SnowflakeId::from_components(0, 5, 0));
}

#[test]
fn sequence_increments_within_same_tick() {
    let worker = SnowflakeWorker::with_clock(0, MockTime { millis: 42 }).unwrap();
    let id1 = worker.next_id().unwrap();
    let id2 = worker.next_id().unwrap();
    let id3 = worker.next_id().unwrap();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn new_tick_resets_sequence() {
    let time = ManualTime::at(42);
    let worker = SnowflakeWorker::with_clock(1, time.clone()).unwrap();
    worker.next_id().unwrap();
    worker.next_id().unwrap();

    time.set(43);
    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn exhausted_millisecond_waits_exactly_once() {
    const CALLS: usize = 4097;
    let time = FrozenTime::new(42, CALLS as u64);
    let worker = SnowflakeWorker::with_clock(9, &time).unwrap();

    let ids: Vec<SnowflakeId> = (0..CALLS).map(|_| worker.next_id().unwrap()).collect();

    for (i, id) in ids[..CALLS - 1].iter().enumerate() {
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.sequence(), i as u64);
    }
    let last = ids[CALLS - 1];
    assert_eq!(last.timestamp(), 43);
    assert_eq!(last.sequence(), 0);

    // One read per call plus a single poll while waiting.
    assert_eq!(time.reads.load(Ordering::SeqCst), CALLS as u64 + 1);
    assert_eq!(ids.iter().filter(|id| id.timestamp() == 43).count(), 1);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), CALLS);
    assert_strictly_increasing(&ids);
}

#[test]
fn fixed_baseline_wraps_and_stays_unique() {
    const CALLS: usize = 4097;
    let time = FrozenTime::new(42, CALLS as u64);
    let worker = SnowflakeWorker::builder(3)
        .clock(&time)
        .sequence_start(SequenceStart::Fixed(4000))
        .build()
        .unwrap();

    let ids: Vec<SnowflakeId> = (0..CALLS).map(|_| worker.next_id().unwrap()).collect();

    assert_eq!(ids[0].sequence(), 4000);
    assert_eq!(ids[95].sequence(), MAX_SEQUENCE);
    assert_eq!(ids[96].sequence(), 0);
    assert_eq!(ids[CALLS - 2].sequence(), 3999);
    assert_eq!(ids[CALLS - 1].timestamp(), 43);
    assert_eq!(ids[CALLS - 1].sequence(), 4000);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), CALLS);
}

#[test]
fn clock_regression_fails_fast_and_keeps_state() {
    let time = ManualTime::at(150);
    let worker = SnowflakeWorker::with_clock(2, time.clone()).unwrap();
    worker.replace_state(SequenceState::with_last(200, 5, 0));

    assert_eq!(
        worker.next_id(),
        Err(Error::ClockMovedBackward { drift_ms: 50 })
    );
    // Repeated failures do not disturb the state either.
    assert_eq!(
        worker.next_id(),
        Err(Error::ClockMovedBackward { drift_ms: 50 })
    );

    time.set(200);
    let id = worker.next_id().unwrap();
    assert_eq!(id.timestamp(), 200);
    assert_eq!(id.sequence(), 6);

    time.set(201);
    assert_eq!(worker.next_id().unwrap(), SnowflakeId::from_components(201, 2, 0));
}

#[test]
fn clock_regression_after_real_ids() {
    let time = ManualTime::at(1_000);
    let worker = SnowflakeWorker::with_clock(2, time.clone()).unwrap();
    let before = worker.next_id().unwrap();

    time.set(990);
    let err = worker.next_id().unwrap_err();
    assert_eq!(err, Error::ClockMovedBackward { drift_ms: 10 });
    assert_eq!(err.to_string(), "clock moved backwards by 10ms");

    time.set(1_000);
    let after = worker.next_id().unwrap();
    assert!(after > before);
    assert_eq!(after.sequence(), 1);
}

#[test]
fn wait_policy_rides_out_small_regression() {
    let time = StepTime::new(vec![100, 97, 98, 99, 100, 101]);
    let worker = SnowflakeWorker::builder(4)
        .clock(&time)
        .clock_policy(ClockPolicy::WaitUpTo(5))
        .build()
        .unwrap();

    let first = worker.next_id().unwrap();
    let second = worker.next_id().unwrap();

    assert_eq!(first, SnowflakeId::from_components(100, 4, 0));
    assert_eq!(second, SnowflakeId::from_components(100, 4, 1));
    assert_eq!(time.index.load(Ordering::SeqCst), 5);
}

#[test]
fn wait_policy_still_fails_beyond_bound() {
    let time = StepTime::new(vec![100, 97]);
    let worker = SnowflakeWorker::builder(4)
        .clock(&time)
        .clock_policy(ClockPolicy::WaitUpTo(2))
        .build()
        .unwrap();

    worker.next_id().unwrap();
    assert_eq!(
        worker.next_id(),
        Err(Error::ClockMovedBackward { drift_ms: 3 })
    );
}

#[test]
fn wait_policy_fails_when_clock_falls_further_behind() {
    let time = StepTime::new(vec![100, 97, 0, 100]);
    let worker = SnowflakeWorker::builder(4)
        .clock(&time)
        .clock_policy(ClockPolicy::WaitUpTo(5))
        .build()
        .unwrap();

    worker.next_id().unwrap();
    assert_eq!(
        worker.next_id(),
        Err(Error::ClockMovedBackward { drift_ms: 100 })
    );
    assert_eq!(time.index.load(Ordering::SeqCst), 3);

    // State is untouched, so the next reading continues the millisecond.
    assert_eq!(
        worker.next_id().unwrap(),
        SnowflakeId::from_components(100, 4, 1)
    );
}

#[test]
fn wait_policy_gives_up_on_stalled_clock() {
    let time = StepTime::new(vec![100, 97]);
    let worker = SnowflakeWorker::builder(4)
        .clock(&time)
        .clock_policy(ClockPolicy::WaitUpTo(5))
        .build()
        .unwrap();

    worker.next_id().unwrap();

    let started = std::time::Instant::now();
    assert_eq!(
        worker.next_id(),
        Err(Error::ClockMovedBackward { drift_ms: 3 })
    );
    let waited = started.elapsed();
    assert!(waited >= std::time::Duration::from_millis(5));
    assert!(waited < std::time::Duration::from_secs(1), "waited {waited:?}");
}

#[test]
fn builder_defaults_match_new() {
    let worker = SnowflakeWorker::builder(8).build().unwrap();
    assert_eq!(worker.worker_id(), 8);
    assert_eq!(worker.clock_policy(), ClockPolicy::FailFast);
    assert_eq!(worker.sequence_start(), 0);
    assert_eq!(*worker.time_source(), SystemClock::default());
}

#[cfg(feature = "random-baseline")]
#[test]
fn random_baseline_is_fixed_per_worker() {
    let worker = SnowflakeWorker::builder(1)
        .clock(MockTime { millis: 7 })
        .sequence_start(SequenceStart::Random)
        .build()
        .unwrap();
    let start = worker.sequence_start();
    assert!(start <= MAX_SEQUENCE);

    let first = worker.next_id().unwrap();
    let second = worker.next_id().unwrap();
    assert_eq!(first.sequence(), start);
    assert_eq!(second.sequence(), (start + 1) & MAX_SEQUENCE);
}

#[cfg(not(feature = "parking-lot"))]
#[test]
fn poisoned_lock_is_reported() {
    use core::sync::atomic::AtomicBool;

    struct PanickingTime {
        panic: AtomicBool,
    }

    impl TimeSource for PanickingTime {
        fn current_millis(&self) -> u64 {
            assert!(!self.panic.load(Ordering::SeqCst), "clock failure");
            1
        }
    }

    let worker = SnowflakeWorker::with_clock(
        0,
        PanickingTime {
            panic: AtomicBool::new(true),
        },
    )
    .unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| worker.next_id()));
    assert!(result.is_err());

    worker.time_source().panic.store(false, Ordering::SeqCst);
    assert_eq!(worker.next_id(), Err(Error::LockPoisoned));
}

#[test]
fn system_clock_ids_strictly_increase() {
    const TOTAL_IDS: usize = 4096 * 8;
    let worker = SnowflakeWorker::new(1).unwrap();

    // A host clock step fails calls until the clock catches up; the IDs that
    // were issued still increase.
    let ids: Vec<SnowflakeId> = (0..TOTAL_IDS)
        .filter_map(|_| match worker.next_id() {
            Ok(id) => Some(id),
            Err(Error::ClockMovedBackward { .. }) => None,
            Err(err) => panic!("unexpected error: {err}"),
        })
        .collect();

    assert!(!ids.is_empty());
    assert!(ids.iter().all(|id| id.worker_id() == 1));
    assert_strictly_increasing(&ids);
}

#[test]
fn threaded_ids_are_unique() {
    const IDS_PER_THREAD: usize = 4096 * 16;
    let threads = num_cpus::get().clamp(2, 8);
    let total_ids = threads * IDS_PER_THREAD;

    let time = TickEvery4096::default();
    let worker = Arc::new(SnowflakeWorker::with_clock(0, &time).unwrap());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(total_ids)));

    scope(|s| {
        for _ in 0..threads {
            let worker = Arc::clone(&worker);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    local.push(worker.next_id().unwrap());
                }
                // Calls from one thread complete in order.
                assert_strictly_increasing(&local);

                let mut seen = seen_ids.lock().unwrap();
                for id in local {
                    assert!(seen.insert(id), "duplicate id {id}");
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, total_ids, "Expected {total_ids} unique IDs");
    // Every millisecond was spent before the clock moved on.
    assert!(time.current_millis() >= (total_ids / 4096) as u64);
}

#[test]
fn separate_workers_do_not_collide() {
    let time = ManualTime::at(77);
    let a = SnowflakeWorker::with_clock(1, time.clone()).unwrap();
    let b = SnowflakeWorker::with_clock(2, time).unwrap();

    let from_a: HashSet<_> = (0..100).map(|_| a.next_id().unwrap()).collect();
    let from_b: HashSet<_> = (0..100).map(|_| b.next_id().unwrap()).collect();
    assert!(from_a.is_disjoint(&from_b));
}
