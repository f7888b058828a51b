#![cfg(test)]

// Property tests for BucketMap kept inside the crate so they can inspect
// bucket placement through the stripe table.

use crate::index::Indexer;
use crate::map::BucketMap;
use crate::MapError;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Get(usize),
    ComputeAdd(usize, i32),
    ComputeRemove(usize),
    ComputeKeepAbsent(usize),
    Unsupported,
}

// Few buckets and a length-based index so distinct keys collide often.
struct ByLen;

impl Indexer<str> for ByLen {
    fn index(&self, key: &str, modulus: usize) -> usize {
        key.len() % modulus
    }
}

impl Indexer<String> for ByLen {
    fn index(&self, key: &String, modulus: usize) -> usize {
        <Self as Indexer<str>>::index(self, key, modulus)
    }
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (1usize..=4, proptest::collection::vec("[a-c]{0,4}", 1..=8)).prop_flat_map(|(buckets, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            idx.clone().prop_map(OpI::Get),
            (idx.clone(), -100i32..100).prop_map(|(i, d)| OpI::ComputeAdd(i, d)),
            idx.clone().prop_map(OpI::ComputeRemove),
            idx.clone().prop_map(OpI::ComputeKeepAbsent),
            Just(OpI::Unsupported),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (buckets, pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `put` returns the previous value and `get` the last stored one.
// - `compute` follows the insert/replace/remove/no-op table and returns the stored value.
// - Every live key sits in exactly the bucket its indexer selects, and in no other.
// - Colliding keys never disturb one another.
// - Unsupported calls always fail with `Unsupported`, never with a default answer.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((buckets, pool, ops) in arb_scenario()) {
        let sut = BucketMap::<String, i32, _>::with_indexer(buckets, ByLen).unwrap();
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = pool[i].clone();
                    prop_assert_eq!(sut.put(k.clone(), v).unwrap(), model.insert(k, v));
                }
                OpI::Get(i) => {
                    let k = pool[i].as_str();
                    prop_assert_eq!(sut.get(k).unwrap(), model.get(k).copied());
                }
                OpI::ComputeAdd(i, d) => {
                    let k = pool[i].clone();
                    let expected = model.get(&k).copied().unwrap_or(0).wrapping_add(d);
                    let got = sut.compute(k.clone(), |_, v| Some(v.copied().unwrap_or(0).wrapping_add(d))).unwrap();
                    prop_assert_eq!(got, Some(expected));
                    model.insert(k, expected);
                }
                OpI::ComputeRemove(i) => {
                    let k = pool[i].clone();
                    let got = sut.compute(k.clone(), |_, _| None).unwrap();
                    prop_assert_eq!(got, None);
                    model.remove(&k);
                }
                OpI::ComputeKeepAbsent(i) => {
                    // Identity remap: present stays, absent stays absent.
                    let k = pool[i].clone();
                    let got = sut.compute(k.clone(), |_, v| v.copied()).unwrap();
                    prop_assert_eq!(got, model.get(&k).copied());
                }
                OpI::Unsupported => {
                    prop_assert!(matches!(sut.len(), Err(MapError::Unsupported(_))));
                    prop_assert!(matches!(sut.contains_key("a"), Err(MapError::Unsupported(_))));
                }
            }
        }

        // Placement: each pool key is found only in its own bucket.
        for k in &pool {
            let home = <ByLen as Indexer<str>>::index(&sut.indexer, k, buckets);
            for b in 0..buckets {
                let found = sut.stripes.read(b).unwrap().get(k.as_str()).copied();
                if b == home {
                    prop_assert_eq!(found, model.get(k).copied());
                } else {
                    prop_assert_eq!(found, None);
                }
            }
        }
    }
}
