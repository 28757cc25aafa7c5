//! Scoring of formed team sets.
//!
//! Two levels, both pure functions of the current membership:
//!
//! 1. **Balance** ([`balance`]) - skill deviation of single teams and pairs
//!    from the global average, spread across the set, and the
//!    "well balanced" / "valid" classifications used by the optimizer.
//!
//! 2. **Objective** ([`objective`]) - one scalar per team set, lower is better,
//!    used only to compare candidate formations against each other.
//!
//! ```text
//! objective = mean |avg - global|
//!           + 1.5 * 10 * (teams breaking the personality rule)
//!           + 1.0 * Σ max(0, 3 - distinct roles) * 2
//! ```
//!
//! The global average is the mean of team averages, not of participants, so
//! every team weighs the same regardless of its size.

pub mod balance;
pub mod objective;
