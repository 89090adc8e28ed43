//! Merging coverage of the same file from several runs
//!
//! Entries are matched by source location, not by id: statements by their
//! span, functions by `loc`, branches by their first arm. Hits of matched
//! entries are summed; everything else is kept from both sides. Ids are
//! renumbered in first-seen order, left side first.

use super::{FileCoverage, Range};
use std::collections::{BTreeMap, HashMap};

trait Hits: Clone {
    fn add(&mut self, other: &Self);
}

impl Hits for u64 {
    fn add(&mut self, other: &Self) {
        *self = self.saturating_add(*other);
    }
}

impl Hits for Vec<u64> {
    fn add(&mut self, other: &Self) {
        if other.len() > self.len() {
            self.resize(other.len(), 0);
        }
        for (mine, theirs) in self.iter_mut().zip(other) {
            *mine = mine.saturating_add(*theirs);
        }
    }
}

/// Insertion-ordered table of (hits, item) keyed by location
struct Merged<H, T> {
    order: Vec<(H, T)>,
    index: HashMap<String, usize>,
}

impl<H: Hits, T: Clone> Merged<H, T> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Collect one side; a repeated location replaces the earlier entry in place
    fn side<K>(hits: &BTreeMap<u32, H>, map: &BTreeMap<u32, T>, key: K) -> Self
    where
        K: Fn(&T) -> String,
    {
        let mut side = Self::new();
        for (id, h) in hits {
            let Some(item) = map.get(id) else {
                continue;
            };
            let k = key(item);
            match side.index.get(&k) {
                Some(&slot) => side.order[slot] = (h.clone(), item.clone()),
                None => {
                    side.index.insert(k, side.order.len());
                    side.order.push((h.clone(), item.clone()));
                }
            }
        }
        side
    }

    fn absorb(&mut self, other: Self) {
        let mut keys: Vec<(usize, String)> = other.index.into_iter().map(|(k, i)| (i, k)).collect();
        keys.sort_unstable_by_key(|(i, _)| *i);
        let mut entries: Vec<Option<(H, T)>> = other.order.into_iter().map(Some).collect();

        for (i, k) in keys {
            let Some((h, item)) = entries[i].take() else {
                continue;
            };
            match self.index.get(&k) {
                Some(&slot) => self.order[slot].0.add(&h),
                None => {
                    self.index.insert(k, self.order.len());
                    self.order.push((h, item));
                }
            }
        }
    }

    fn into_maps(self) -> (BTreeMap<u32, H>, BTreeMap<u32, T>) {
        let mut hits = BTreeMap::new();
        let mut map = BTreeMap::new();
        for (i, (h, item)) in self.order.into_iter().enumerate() {
            hits.insert(i as u32, h);
            map.insert(i as u32, item);
        }
        (hits, map)
    }
}

fn merge_prop<H, T, K>(
    a_hits: &BTreeMap<u32, H>,
    a_map: &BTreeMap<u32, T>,
    b_hits: &BTreeMap<u32, H>,
    b_map: &BTreeMap<u32, T>,
    key: K,
) -> (BTreeMap<u32, H>, BTreeMap<u32, T>)
where
    H: Hits,
    T: Clone,
    K: Fn(&T) -> String,
{
    let mut merged = Merged::side(a_hits, a_map, &key);
    merged.absorb(Merged::side(b_hits, b_map, &key));
    merged.into_maps()
}

impl FileCoverage {
    /// Merge coverage of the same file from another run
    pub fn merge(&mut self, other: &Self) {
        if other.all {
            return;
        }
        if self.all {
            *self = other.clone();
            return;
        }

        let (s, statement_map) = merge_prop(
            &self.s,
            &self.statement_map,
            &other.s,
            &other.statement_map,
            Range::key,
        );
        self.s = s;
        self.statement_map = statement_map;

        let (f, fn_map) = merge_prop(&self.f, &self.fn_map, &other.f, &other.fn_map, |m| {
            m.loc.key()
        });
        self.f = f;
        self.fn_map = fn_map;

        let (b, branch_map) = merge_prop(
            &self.b,
            &self.branch_map,
            &other.b,
            &other.branch_map,
            |m| m.locations.first().unwrap_or(&m.loc).key(),
        );
        self.b = b;
        self.branch_map = branch_map;
    }
}
