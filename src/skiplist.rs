//! The ordered index: a probabilistic skip list over `(score, key)` pairs.
//!
//! Nodes live in one arena (`Vec<Option<SkipNode<K>>>`) and reference each
//! other by index rather than by pointer — there is no raw pointer or
//! `unsafe` anywhere in this module. Index `0` is reserved for the head
//! sentinel and is never freed. Freed real-node slots are pushed onto
//! `free` and reused by the next insert, so repeated insert/delete cycles
//! don't grow the arena without bound.
//!
//! This module has no notion of "not found as an error" — callers
//! (the façade) are expected to have already checked presence via the
//! hash index before calling `insert`, and to interpret `delete`'s `bool`
//! / `find_rank`'s `0` as ordinary results, not failures.

use rand::Rng;

use crate::config::SkipListConfig;
use crate::types::{LexRange, ScoreRange};

struct Level {
    forward: Option<usize>,
    span: usize,
}

struct SkipNode<K> {
    /// `None` only for the head sentinel at index 0.
    key: Option<K>,
    score: f64,
    levels: Vec<Level>,
    backward: Option<usize>,
}

pub(crate) struct SkipList<K> {
    nodes: Vec<Option<SkipNode<K>>>,
    free: Vec<usize>,
    tail: Option<usize>,
    level: usize,
    length: usize,
    max_level: usize,
    p: f64,
}

const HEAD: usize = 0;

impl<K: Ord + Clone> SkipList<K> {
    pub(crate) fn new(config: SkipListConfig) -> Self {
        let head = SkipNode {
            key: None,
            score: 0.0,
            levels: (0..config.max_level)
                .map(|_| Level {
                    forward: None,
                    span: 0,
                })
                .collect(),
            backward: None,
        };
        SkipList {
            nodes: vec![Some(head)],
            free: Vec::new(),
            tail: None,
            level: 1,
            length: 0,
            max_level: config.max_level,
            p: config.p,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.length
    }

    fn node(&self, idx: usize) -> &SkipNode<K> {
        self.nodes[idx].as_ref().expect("dangling skiplist index")
    }

    fn node_mut(&mut self, idx: usize) -> &mut SkipNode<K> {
        self.nodes[idx].as_mut().expect("dangling skiplist index")
    }

    fn random_level(&self) -> usize {
        let mut level = 1;
        let mut rng = rand::thread_rng();
        while level < self.max_level && rng.gen::<f64>() < self.p {
            level += 1;
        }
        level
    }

    fn alloc(&mut self, key: K, score: f64, level: usize) -> usize {
        let node = SkipNode {
            key: Some(key),
            score,
            levels: (0..level)
                .map(|_| Level {
                    forward: None,
                    span: 0,
                })
                .collect(),
            backward: None,
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Some(node));
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.nodes[idx] = None;
        self.free.push(idx);
    }

    /// `(forward.score, forward.key) < (score, key)`.
    fn pair_less(forward_score: f64, forward_key: &K, score: f64, key: &K) -> bool {
        forward_score < score || (forward_score == score && forward_key < key)
    }

    /// `(forward.score, forward.key) <= (score, key)`.
    fn pair_le(forward_score: f64, forward_key: &K, score: f64, key: &K) -> bool {
        forward_score < score || (forward_score == score && forward_key <= key)
    }

    /// Precondition: `key` is not already present. The façade is
    /// responsible for enforcing this by checking the hash index first.
    pub(crate) fn insert(&mut self, key: K, score: f64) -> usize {
        let mut update = vec![HEAD; self.max_level];
        let mut rank = vec![0usize; self.max_level];

        let mut x = HEAD;
        for i in (0..self.level).rev() {
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                let fnode = self.node(f);
                if Self::pair_less(fnode.score, fnode.key.as_ref().unwrap(), score, &key) {
                    rank[i] += self.node(x).levels[i].span;
                    x = f;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        let level = self.random_level();
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = HEAD;
                self.node_mut(HEAD).levels[i].span = self.length;
            }
            self.level = level;
        }

        let new_idx = self.alloc(key, score, level);
        for i in 0..level {
            let old_forward = self.node(update[i]).levels[i].forward;
            let old_span = self.node(update[i]).levels[i].span;

            let new_node = self.node_mut(new_idx);
            new_node.levels[i].forward = old_forward;
            new_node.levels[i].span = old_span - (rank[0] - rank[i]);

            let pred = self.node_mut(update[i]);
            pred.levels[i].forward = Some(new_idx);
            pred.levels[i].span = (rank[0] - rank[i]) + 1;
        }
        for i in level..self.level {
            self.node_mut(update[i]).levels[i].span += 1;
        }

        let backward = if update[0] == HEAD {
            None
        } else {
            Some(update[0])
        };
        self.node_mut(new_idx).backward = backward;

        match self.node(new_idx).levels[0].forward {
            Some(f) => self.node_mut(f).backward = Some(new_idx),
            None => self.tail = Some(new_idx),
        }

        self.length += 1;
        new_idx
    }

    /// Unlinks `x` from every level it participates in, folding its span
    /// into the predecessor recorded in `update`, and shrinks `current_level`
    /// while the head's topmost forward link is now empty.
    fn delete_node(&mut self, x: usize, update: &[usize]) {
        for i in 0..self.level {
            let pred_forward = self.node(update[i]).levels[i].forward;
            if pred_forward == Some(x) {
                let x_span = self.node(x).levels[i].span;
                let x_forward = self.node(x).levels[i].forward;
                let pred = self.node_mut(update[i]);
                pred.levels[i].span += x_span - 1;
                pred.levels[i].forward = x_forward;
            } else {
                self.node_mut(update[i]).levels[i].span -= 1;
            }
        }

        let x_forward = self.node(x).levels[0].forward;
        let x_backward = self.node(x).backward;
        match x_forward {
            Some(f) => self.node_mut(f).backward = x_backward,
            None => self.tail = x_backward,
        }

        while self.level > 1 && self.node(HEAD).levels[self.level - 1].forward.is_none() {
            self.level -= 1;
        }

        self.free_node(x);
        self.length -= 1;
    }

    fn walk_to_predecessors(&self, score: f64, key: &K) -> Vec<usize> {
        let mut update = vec![HEAD; self.max_level];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                let fnode = self.node(f);
                if Self::pair_less(fnode.score, fnode.key.as_ref().unwrap(), score, key) {
                    x = f;
                } else {
                    break;
                }
            }
            update[i] = x;
        }
        update
    }

    pub(crate) fn delete(&mut self, score: f64, key: &K) -> bool {
        let update = self.walk_to_predecessors(score, key);
        let x = update[0];
        if let Some(c) = self.node(x).levels[0].forward {
            let cnode = self.node(c);
            if cnode.score == score && cnode.key.as_ref().unwrap() == key {
                self.delete_node(c, &update);
                return true;
            }
        }
        false
    }

    /// Returns the 1-based rank of `key` (which must have score `score`),
    /// or `0` if not found.
    pub(crate) fn find_rank(&self, score: f64, key: &K) -> usize {
        let mut rank = 0usize;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                let fnode = self.node(f);
                if Self::pair_le(fnode.score, fnode.key.as_ref().unwrap(), score, key) {
                    rank += self.node(x).levels[i].span;
                    x = f;
                } else {
                    break;
                }
            }
            if self.node(x).key.as_ref() == Some(key) {
                return rank;
            }
        }
        0
    }

    /// Returns the arena index of the node at 1-based `rank`, or `None` if
    /// `rank` is `0` or exceeds the list length.
    pub(crate) fn find_by_rank(&self, rank: usize) -> Option<usize> {
        if rank == 0 || rank > self.length {
            return None;
        }
        let mut traversed = 0usize;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                let span = self.node(x).levels[i].span;
                if traversed + span <= rank {
                    traversed += span;
                    x = f;
                } else {
                    break;
                }
            }
            if traversed == rank {
                return Some(x);
            }
        }
        None
    }

    pub(crate) fn is_in_score_range(&self, range: &ScoreRange) -> bool {
        if range.is_empty() {
            return false;
        }
        let Some(tail) = self.tail else { return false };
        if !range.value_gte_min(self.node(tail).score) {
            return false;
        }
        let Some(first) = self.node(HEAD).levels[0].forward else {
            return false;
        };
        range.value_lte_max(self.node(first).score)
    }

    pub(crate) fn first_in_range(&self, range: &ScoreRange) -> Option<usize> {
        if !self.is_in_score_range(range) {
            return None;
        }
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                if !range.value_gte_min(self.node(f).score) {
                    x = f;
                } else {
                    break;
                }
            }
        }
        let candidate = self.node(x).levels[0].forward?;
        range.value_lte_max(self.node(candidate).score).then_some(candidate)
    }

    pub(crate) fn last_in_range(&self, range: &ScoreRange) -> Option<usize> {
        if !self.is_in_score_range(range) {
            return None;
        }
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                if range.value_lte_max(self.node(f).score) {
                    x = f;
                } else {
                    break;
                }
            }
        }
        if x == HEAD {
            return None;
        }
        range.value_gte_min(self.node(x).score).then_some(x)
    }

    /// Removes every member whose score falls in `range`. Returns the
    /// removed `(key, score)` pairs in ascending order.
    pub(crate) fn delete_by_score(&mut self, range: &ScoreRange) -> Vec<(K, f64)> {
        let mut update = vec![HEAD; self.max_level];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                let score = self.node(f).score;
                let below_min = if range.min_exclusive {
                    score <= range.min
                } else {
                    score < range.min
                };
                if below_min {
                    x = f;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        let mut removed = Vec::new();
        let mut cur = self.node(x).levels[0].forward;
        while let Some(c) = cur {
            let score = self.node(c).score;
            let within_max = if range.max_exclusive {
                score < range.max
            } else {
                score <= range.max
            };
            if !within_max {
                break;
            }
            let next = self.node(c).levels[0].forward;
            let key = self.node(c).key.clone().unwrap();
            self.delete_node(c, &update);
            removed.push((key, score));
            cur = next;
        }
        removed
    }

    /// Removes every member whose key falls in `range` (lexicographic
    /// delete; scores are incidental). Returns the removed pairs in
    /// ascending order.
    pub(crate) fn delete_by_lex(&mut self, range: &LexRange<K>) -> Vec<(K, f64)> {
        let mut update = vec![HEAD; self.max_level];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                let fnode = self.node(f);
                if !range.key_gte_min(fnode.key.as_ref().unwrap()) {
                    x = f;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        let mut removed = Vec::new();
        let mut cur = self.node(x).levels[0].forward;
        while let Some(c) = cur {
            let key_in_range = range.key_lte_max(self.node(c).key.as_ref().unwrap());
            if !key_in_range {
                break;
            }
            let next = self.node(c).levels[0].forward;
            let key = self.node(c).key.clone().unwrap();
            let score = self.node(c).score;
            self.delete_node(c, &update);
            removed.push((key, score));
            cur = next;
        }
        removed
    }

    /// Removes members ranked `[start, end]`, 1-based inclusive. Returns
    /// the removed pairs in ascending order.
    pub(crate) fn delete_by_rank(&mut self, start: usize, end: usize) -> Vec<(K, f64)> {
        let mut update = vec![HEAD; self.max_level];
        let mut traversed = 0usize;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.node(x).levels[i].forward;
                let Some(f) = forward else { break };
                let span = self.node(x).levels[i].span;
                if traversed + span < start {
                    traversed += span;
                    x = f;
                } else {
                    break;
                }
            }
            update[i] = x;
        }

        traversed += 1;
        let mut removed = Vec::new();
        let mut cur = self.node(x).levels[0].forward;
        while let Some(c) = cur {
            if traversed > end {
                break;
            }
            let next = self.node(c).levels[0].forward;
            let key = self.node(c).key.clone().unwrap();
            let score = self.node(c).score;
            self.delete_node(c, &update);
            removed.push((key, score));
            traversed += 1;
            cur = next;
        }
        removed
    }

    pub(crate) fn key_score_at(&self, idx: usize) -> (&K, f64) {
        let node = self.node(idx);
        (node.key.as_ref().unwrap(), node.score)
    }

    pub(crate) fn forward_of(&self, idx: usize) -> Option<usize> {
        self.node(idx).levels[0].forward
    }

    pub(crate) fn backward_of(&self, idx: usize) -> Option<usize> {
        self.node(idx).backward
    }

    pub(crate) fn head(&self) -> usize {
        HEAD
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    /// Sum of level-`level` spans from the head to the end. Used by the
    /// property tests to check invariant 3: this must always equal
    /// `length`.
    #[cfg(test)]
    fn span_sum_at_level(&self, level: usize) -> usize {
        let mut total = 0;
        let mut x = HEAD;
        while let Some(f) = self.node(x).levels.get(level).and_then(|l| l.forward) {
            total += self.node(x).levels[level].span;
            x = f;
        }
        total
    }

    #[cfg(test)]
    fn current_level(&self) -> usize {
        self.level
    }
}
