//! # Sorted Set
//!
//! An in-memory ordered associative container: unique keys of an ordered,
//! hashable type mapped to `f64` scores, kept in total order by
//! `(score, key)`. This is the sorted-set primitive used by key-value
//! stores such as Redis for their `ZADD`/`ZRANK`/`ZRANGE` family of
//! commands, lifted out as a standalone, embeddable data structure.
//!
//! ## Core idea
//! Two indices, kept in lockstep by one façade:
//!   - a probabilistic **skip list**, ordered by `(score, key)`, whose
//!     per-level span counters make rank queries logarithmic;
//!   - a **hash index** from key to `(score, attachment)`, giving O(1)
//!     expected point lookup.
//!
//! Every write goes through [`SortedSet`], which updates both indices
//! together; every read either consults the hash index directly
//! (key-indexed) or walks the skip list (rank- and range-indexed).
//!
//! This crate has no persistence, no network surface, and is not safe
//! for concurrent mutation — see the crate-level concurrency notes in
//! `DESIGN.md` for the full rationale.

pub mod config;
pub mod error;
mod index;
mod skiplist;
mod sortedset;
pub mod types;

pub use config::SkipListConfig;
pub use error::{Error, Result};
pub use sortedset::{RankInfo, RankedMember, SortedSet};
pub use types::{LexRange, ScoreRange};
