// BucketMap multi-threaded tests.
//
// Invariants exercised:
// - No lost updates: concurrent `compute` increments on one key all land.
// - Per-key isolation: writers on different keys (same or different
//   buckets) never observe each other's values.
// - Readers only ever see fully written values.
// - Poison is surfaced per stripe after a panicking `compute`.
use bucket_map::{BucketMap, MapError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const ROUNDS: usize = 2_000;

fn increment(_: &&str, v: Option<&usize>) -> Option<usize> {
    Some(v.copied().unwrap_or(0) + 1)
}

// Test: N threads each compute-increment one key M times.
// Verifies: the final count is exactly N * M.
#[test]
fn compute_has_no_lost_updates() {
    let m: BucketMap<&str, usize> = BucketMap::new(4).unwrap();
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    m.compute("hits", increment).unwrap();
                }
            });
        }
    });
    assert_eq!(m.get(&"hits"), Ok(Some(THREADS * ROUNDS)));
}

// Test: the same contention, with every key forced into one bucket.
// Verifies: a shared stripe serializes unrelated keys without mixing them.
#[test]
fn shared_bucket_counters_stay_separate() {
    let m = BucketMap::<usize, usize, _>::with_indexer(16, |_: &usize, _: usize| 3usize).unwrap();
    thread::scope(|s| {
        for t in 0..THREADS {
            let m = &m;
            s.spawn(move || {
                for i in 0..ROUNDS {
                    // Each thread bumps its own key and a shared one.
                    m.compute(t, |_, v| Some(v.copied().unwrap_or(0) + 1)).unwrap();
                    m.compute(usize::MAX, |_, v| Some(v.copied().unwrap_or(0) + i % 2)).unwrap();
                }
            });
        }
    });
    for t in 0..THREADS {
        assert_eq!(m.get(&t), Ok(Some(ROUNDS)));
    }
    assert_eq!(m.get(&usize::MAX), Ok(Some(THREADS * ROUNDS / 2)));
}

// Test: readers racing a writer that stores (n, n * 3) pairs.
// Verifies: every observed value is internally consistent and the
// sequence a reader sees never goes backwards.
#[test]
fn readers_never_see_torn_values() {
    let m: Arc<BucketMap<u8, (u64, u64)>> = Arc::new(BucketMap::new(2).unwrap());
    let done = Arc::new(AtomicBool::new(false));
    m.put(0u8, (0u64, 0u64)).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let m = Arc::clone(&m);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last = 0;
                while !done.load(Ordering::Acquire) {
                    let (a, b) = m.get(&0).unwrap().expect("key is never removed");
                    assert_eq!(b, a * 3);
                    assert!(a >= last);
                    last = a;
                }
            })
        })
        .collect();

    for n in 1..=10_000u64 {
        m.put(0, (n, n * 3)).unwrap();
    }
    done.store(true, Ordering::Release);
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(m.get(&0), Ok(Some((10_000, 30_000))));
}

// Test: mixed put/compute/remove traffic across many keys.
// Assumes: each thread owns a disjoint key range.
// Verifies: every thread's final state is exactly what it wrote.
#[test]
fn disjoint_writers_over_many_buckets() {
    let m: BucketMap<u32, u32> = BucketMap::new(7).unwrap();
    thread::scope(|s| {
        for t in 0..THREADS as u32 {
            let m = &m;
            s.spawn(move || {
                let base = t * 1_000;
                for k in base..base + 100 {
                    assert_eq!(m.put(k, 1u32), Ok(None));
                }
                for k in base..base + 100 {
                    m.compute(k, |_, v| v.map(|x| x + 1)).unwrap();
                }
                for k in (base..base + 100).step_by(2) {
                    assert_eq!(m.compute(k, |_, _| None), Ok(None));
                }
            });
        }
    });
    for t in 0..THREADS as u32 {
        let base = t * 1_000;
        for k in base..base + 100 {
            let expected = if (k - base) % 2 == 0 { None } else { Some(2) };
            assert_eq!(m.get(&k), Ok(expected));
        }
    }
}

// Test: parallel workers memoizing and counting partial results, the way a
// fork-join search shares state across branches.
// Verifies: each memo entry is computed once and tallies are exact.
#[test]
fn parallel_memo_and_tally() {
    let memo: BucketMap<u64, u64> = BucketMap::new(32).unwrap();
    let tally: BucketMap<u64, u64> = BucketMap::new(8).unwrap();
    let evaluations: BucketMap<u64, u32> = BucketMap::new(32).unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for depth in 0..64u64 {
                    memo.compute(depth, |d, cached| {
                        if cached.is_none() {
                            evaluations
                                .compute(*d, |_, n| Some(n.copied().unwrap_or(0) + 1))
                                .unwrap();
                        }
                        Some(cached.copied().unwrap_or(d * d))
                    })
                    .unwrap();
                    tally
                        .compute(depth % 8, |_, n| Some(n.copied().unwrap_or(0) + 1))
                        .unwrap();
                }
            });
        }
    });

    for depth in 0..64u64 {
        assert_eq!(memo.get(&depth), Ok(Some(depth * depth)));
        assert_eq!(evaluations.get(&depth), Ok(Some(1)));
    }
    for slot in 0..8u64 {
        assert_eq!(tally.get(&slot), Ok(Some(THREADS as u64 * 8)));
    }
}

// Test: a remap that panics while holding the write lock.
// Verifies: that stripe reports `Poisoned` to every later caller; other
// stripes keep working.
#[test]
fn panicking_compute_poisons_only_its_stripe() {
    let m = BucketMap::<u32, u32, _>::with_indexer(2, |k: &u32, n: usize| *k as usize % n).unwrap();
    m.put(0, 0).unwrap();
    m.put(1, 1).unwrap();

    let res = thread::scope(|s| {
        s.spawn(|| {
            m.compute(0, |_, _| panic!("remap failed")).unwrap();
        })
        .join()
    });
    assert!(res.is_err());

    assert_eq!(m.get(&0), Err(MapError::Poisoned { bucket: 0 }));
    assert_eq!(m.put(2, 2), Err(MapError::Poisoned { bucket: 0 }));
    assert_eq!(
        m.compute(4, |_, _| Some(4)),
        Err(MapError::Poisoned { bucket: 0 })
    );
    assert_eq!(m.get(&1), Ok(Some(1)));
    assert_eq!(m.put(3, 3), Ok(None));
}

// Test: the map can be shared with any number of threads.
#[test]
fn map_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<BucketMap<String, Vec<u8>>>();
}
