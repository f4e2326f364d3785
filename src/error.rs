use thiserror::Error;

/// Error type for the sorted set.
///
/// Absent-key conditions are not represented here — per the container's
/// contract they are sentinel return values (rank `-1`, a `None` score,
/// an empty range), not failures. The only way to make this crate return
/// an `Err` is to hand it a score that isn't a real number.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// A NaN score was passed to `set`, or `incr_by` would have produced
    /// one. Scores must be totally ordered, and NaN is not orderable.
    #[error("score must be finite, got {0}")]
    NonFiniteScore(f64),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
