//! Tuning knobs for the skip list's probabilistic structure.

/// LevelDB and Redis both use `1/4`; we keep that default.
pub const DEFAULT_P: f64 = 0.25;

/// Matches the reference skip list's `ZSKIPLIST_MAXLEVEL`. Large enough
/// that the probability of ever needing more levels is vanishingly small
/// for any list that fits in memory.
pub const DEFAULT_MAX_LEVEL: usize = 32;

/// Configuration for a [`crate::SortedSet`].
///
/// Most callers should use [`SkipListConfig::default`] via
/// `SortedSet::new`. `max_level` and `p` only affect performance, never
/// observable ordering — insertion order and node height never change
/// which member ranks where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipListConfig {
    /// Probability of promoting a node to the next level. Must be in
    /// `(0, 1)`.
    pub p: f64,
    /// Maximum number of levels a node may have. Must be `>= 1`.
    pub max_level: usize,
}

impl Default for SkipListConfig {
    fn default() -> Self {
        SkipListConfig {
            p: DEFAULT_P,
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

impl SkipListConfig {
    /// Build a config, asserting the tunables are within sane bounds.
    ///
    /// # Panics
    /// Panics if `p` is not in `(0, 1)` or `max_level` is `0`.
    pub fn new(p: f64, max_level: usize) -> Self {
        assert!(p > 0.0 && p < 1.0, "p must be in (0, 1), got {p}");
        assert!(max_level >= 1, "max_level must be >= 1");
        SkipListConfig { p, max_level }
    }
}
