//! Statistical helpers for the teamforge workspace.
//!
//! Team formation compares whole team sets by how evenly skill is spread across
//! them. The quantities involved (global average, spread, per-team deviation) are
//! all plain descriptive statistics over the list of team-average skills, so they
//! live here rather than in the engine.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ```
//! use teamforge_stats::descriptive::DescriptiveStats;
//!
//! let team_averages = [4.5, 5.0, 6.5];
//! let stats = DescriptiveStats::new(team_averages).unwrap();
//! assert!((stats.mean - 16.0 / 3.0).abs() < 1e-12);
//! assert_eq!(stats.range(), 2.0);
//! ```

pub mod descriptive;
