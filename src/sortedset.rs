//! The façade: coordinates the skip list and the hash index so every
//! mutation keeps both consistent, and exposes the user-visible API.

use std::hash::Hash;

use tracing::debug;

use crate::config::SkipListConfig;
use crate::error::Result;
use crate::index::{HashIndex, Record};
use crate::skiplist::SkipList;
use crate::types::{check_score, LexRange, ScoreRange};

/// The result of a rank lookup: `rank(key, reverse)`.
///
/// `rank` is `-1` and `attachment` is `None` when the key is absent —
/// a deliberate sentinel rather than an error, since an absent key is
/// an ordinary outcome, not a failure.
pub struct RankInfo<'a, V> {
    pub rank: i64,
    pub score: f64,
    pub attachment: Option<&'a V>,
}

/// The result of a position lookup: `data_by_rank(rank, reverse)`.
pub struct RankedMember<'a, K, V> {
    pub key: &'a K,
    pub score: f64,
    pub attachment: &'a V,
}

/// An in-memory sorted set: unique keys of type `K` mapped to `f64`
/// scores, kept in total order by `(score, key)`.
///
/// Backed by a skip list (the ordered index) and a hash map (the
/// key-indexed lookup), kept in lockstep by every mutating method here.
/// Not safe to mutate from more than one thread at a time; see the
/// crate's concurrency notes.
pub struct SortedSet<K, V> {
    skiplist: SkipList<K>,
    index: HashIndex<K, V>,
}

impl<K, V> SortedSet<K, V>
where
    K: Ord + Clone + Hash,
{
    /// Creates an empty sorted set with the default skip list tuning
    /// (`p = 0.25`, `max_level = 32`, matching the Redis/LevelDB
    /// convention).
    pub fn new() -> Self {
        Self::with_config(SkipListConfig::default())
    }

    /// Creates an empty sorted set with custom skip list tuning. Tuning
    /// affects performance only, never observable ordering.
    pub fn with_config(config: SkipListConfig) -> Self {
        SortedSet {
            skiplist: SkipList::new(config),
            index: HashIndex::new(),
        }
    }

    /// Number of members currently stored. Always equal to both the
    /// hash index's size and the skip list's length (invariant 1).
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.skiplist.len(), self.index.len());
        self.skiplist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upsert: inserts `key` at `score` with `attachment`, or updates an
    /// existing member's score/attachment. Rejects NaN scores.
    pub fn set(&mut self, key: K, score: f64, attachment: V) -> Result<()> {
        check_score(score)?;
        match self.index.get(&key) {
            None => {
                self.skiplist.insert(key.clone(), score);
                self.index.insert(key.clone(), Record { score, attachment });
                debug!(len = self.index.len(), "sorted_set.set inserted new member");
            }
            Some(existing) if existing.score != score => {
                let old_score = existing.score;
                self.skiplist.delete(old_score, &key);
                self.skiplist.insert(key.clone(), score);
                self.index.insert(key.clone(), Record { score, attachment });
                debug!(len = self.index.len(), "sorted_set.set moved member to new score");
            }
            Some(_) => {
                // Same score: only the attachment changes, rank is untouched.
                let record = self.index.get_mut(&key).unwrap();
                record.attachment = attachment;
            }
        }
        Ok(())
    }

    /// Adds `delta` to `key`'s score. If `key` is absent, it is inserted
    /// at score `delta` with a default attachment — this crate's chosen
    /// resolution of the source's two divergent variants (see
    /// `DESIGN.md`). Returns the resulting score.
    pub fn incr_by(&mut self, key: K, delta: f64) -> Result<f64>
    where
        V: Default,
    {
        match self.index.get(&key) {
            None => {
                check_score(delta)?;
                self.skiplist.insert(key.clone(), delta);
                self.index.insert(
                    key.clone(),
                    Record {
                        score: delta,
                        attachment: V::default(),
                    },
                );
                debug!(len = self.index.len(), "sorted_set.incr_by inserted new member");
                Ok(delta)
            }
            Some(existing) => {
                let old_score = existing.score;
                if delta == 0.0 {
                    return Ok(old_score);
                }
                let new_score = old_score + delta;
                check_score(new_score)?;
                self.skiplist.delete(old_score, &key);
                self.skiplist.insert(key.clone(), new_score);
                self.index.get_mut(&key).unwrap().score = new_score;
                debug!(len = self.index.len(), "sorted_set.incr_by moved member");
                Ok(new_score)
            }
        }
    }

    /// Removes `key`. Returns whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(record) => {
                self.skiplist.delete(record.score, key);
                debug!(len = self.index.len(), "sorted_set.delete removed member");
                true
            }
            None => false,
        }
    }

    pub fn get_score(&self, key: &K) -> Option<f64> {
        self.index.get(key).map(|r| r.score)
    }

    pub fn get_attachment(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|r| &r.attachment)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains(key)
    }

    /// Position of `key` in the ordered sequence, 0-based. Ascending when
    /// `reverse` is `false`, descending when `true`. Returns the sentinel
    /// `RankInfo { rank: -1, score: 0.0, attachment: None }` if `key` is
    /// absent.
    pub fn rank(&self, key: &K, reverse: bool) -> RankInfo<'_, V> {
        let Some(record) = self.index.get(key) else {
            return RankInfo {
                rank: -1,
                score: 0.0,
                attachment: None,
            };
        };
        let r = self.skiplist.find_rank(record.score, key);
        debug_assert!(r > 0, "key present in hash index but not in skiplist");
        let rank = if reverse {
            self.len() as i64 - r as i64
        } else {
            r as i64 - 1
        };
        RankInfo {
            rank,
            score: record.score,
            attachment: Some(&record.attachment),
        }
    }

    /// Member at 0-based position `rank` in the ordered sequence.
    /// Ascending when `reverse` is `false`, descending when `true`.
    /// `rank` outside `[0, len())` is a no-op that returns `None`.
    pub fn data_by_rank(&self, rank: i64, reverse: bool) -> Option<RankedMember<'_, K, V>> {
        if rank < 0 || rank as usize >= self.len() {
            return None;
        }
        let rank = rank as usize;
        let skiplist_rank = if reverse {
            self.len() - rank
        } else {
            rank + 1
        };
        let idx = self.skiplist.find_by_rank(skiplist_rank)?;
        let (key, score) = self.skiplist.key_score_at(idx);
        let record = self.index.get(key).expect("skiplist/hash index divergence");
        Some(RankedMember {
            key,
            score,
            attachment: &record.attachment,
        })
    }

    fn resolve_range_bounds(&self, start: i64, end: i64) -> Option<(usize, usize)> {
        let len = self.len() as i64;
        if len == 0 {
            return None;
        }
        let mut start = if start < 0 { start + len } else { start };
        let mut end = if end < 0 { end + len } else { end };
        if start < 0 {
            start = 0;
        }
        if start > end || start >= len {
            return None;
        }
        if end >= len {
            end = len - 1;
        }
        Some((start as usize, end as usize))
    }

    /// Visits the inclusive, 0-based slice `[start, end]` in ascending
    /// order, calling `f(score, key, attachment)` for each member.
    /// Negative indices count from the end. Out-of-range bounds clamp or
    /// no-op per the façade's range contract rather than erroring.
    pub fn range(&self, start: i64, end: i64, mut f: impl FnMut(f64, &K, &V)) {
        let Some((start, end)) = self.resolve_range_bounds(start, end) else {
            return;
        };
        let Some(mut idx) = self.skiplist.find_by_rank(start + 1) else {
            return;
        };
        for _ in start..=end {
            let (key, score) = self.skiplist.key_score_at(idx);
            let record = self.index.get(key).expect("skiplist/hash index divergence");
            f(score, key, &record.attachment);
            match self.skiplist.forward_of(idx) {
                Some(next) => idx = next,
                None => break,
            }
        }
    }

    /// Visits the inclusive, 0-based slice `[start, end]` in descending
    /// order (position `0` is the highest-scored member), calling
    /// `f(score, key, attachment)` for each member.
    pub fn rev_range(&self, start: i64, end: i64, mut f: impl FnMut(f64, &K, &V)) {
        let Some((start, end)) = self.resolve_range_bounds(start, end) else {
            return;
        };
        let ascending_rank = self.len() - start;
        let Some(mut idx) = self.skiplist.find_by_rank(ascending_rank) else {
            return;
        };
        for _ in start..=end {
            let (key, score) = self.skiplist.key_score_at(idx);
            let record = self.index.get(key).expect("skiplist/hash index divergence");
            f(score, key, &record.attachment);
            match self.skiplist.backward_of(idx) {
                Some(prev) if prev != self.skiplist.head() => idx = prev,
                _ => break,
            }
        }
    }

    /// O(1) check for whether any member's score falls in `range`,
    /// without walking the list — checks the tail against `range`'s
    /// minimum and the lowest-scored member against its maximum.
    pub fn has_member_in_score_range(&self, range: ScoreRange) -> bool {
        self.skiplist.is_in_score_range(&range)
    }

    /// Lowest-scored member whose score falls in `range`, if any.
    pub fn first_in_score_range(&self, range: ScoreRange) -> Option<RankedMember<'_, K, V>> {
        let idx = self.skiplist.first_in_range(&range)?;
        let (key, score) = self.skiplist.key_score_at(idx);
        let record = self.index.get(key).expect("skiplist/hash index divergence");
        Some(RankedMember {
            key,
            score,
            attachment: &record.attachment,
        })
    }

    /// Highest-scored member whose score falls in `range`, if any.
    pub fn last_in_score_range(&self, range: ScoreRange) -> Option<RankedMember<'_, K, V>> {
        let idx = self.skiplist.last_in_range(&range)?;
        let (key, score) = self.skiplist.key_score_at(idx);
        let record = self.index.get(key).expect("skiplist/hash index divergence");
        Some(RankedMember {
            key,
            score,
            attachment: &record.attachment,
        })
    }

    /// Removes every member whose score falls in `range`. Returns the
    /// count removed.
    pub fn delete_by_score(&mut self, range: ScoreRange) -> usize {
        let removed = self.skiplist.delete_by_score(&range);
        let count = removed.len();
        for (key, _) in removed {
            self.index.remove(&key);
        }
        debug!(count, len = self.index.len(), "sorted_set.delete_by_score");
        count
    }

    /// Removes every member whose key falls in `range` (scores are
    /// incidental). Returns the count removed.
    pub fn delete_by_lex(&mut self, range: LexRange<K>) -> usize {
        let removed = self.skiplist.delete_by_lex(&range);
        let count = removed.len();
        for (key, _) in removed {
            self.index.remove(&key);
        }
        debug!(count, len = self.index.len(), "sorted_set.delete_by_lex");
        count
    }

    /// Removes members ranked `[start, end]`, 1-based inclusive — the
    /// skip list's own rank numbering (see the crate-level docs for why
    /// this differs from `range`'s 0-based convention). Returns the
    /// count removed.
    pub fn delete_by_rank(&mut self, start: usize, end: usize) -> usize {
        let removed = self.skiplist.delete_by_rank(start, end);
        let count = removed.len();
        for (key, _) in removed {
            self.index.remove(&key);
        }
        debug!(count, len = self.index.len(), "sorted_set.delete_by_rank");
        count
    }
}

impl<K, V> Default for SortedSet<K, V>
where
    K: Ord + Clone + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

