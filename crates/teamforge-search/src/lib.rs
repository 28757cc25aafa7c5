//! Search over candidate formations.
//!
//! This crate turns the greedy builder from `teamforge-engine` into a full
//! formation run and then searches over many runs for the best result.
//!
//! # Single formation
//!
//! [`GreedyFormation`](formation::GreedyFormation) implements
//! [`FormationStrategy`](formation::FormationStrategy):
//!
//! 1. validate the input and shuffle participants into per-tier queues
//! 2. build `participants / team_size` slots (on worker threads in random mode)
//! 3. repair personality-rule violations by swapping members between teams
//!    ([`rebalancer`])
//! 4. optionally trade members for skill balance ([`optimizer`])
//! 5. dissolve teams that still break a rule and apply the leftover
//!    disposition
//!
//! # Attempt pipeline
//!
//! [`AttemptPipeline`](pipeline::AttemptPipeline) repeats a strategy, scores
//! each result with an [`ObjectiveEvaluator`](teamforge_evaluator::objective::ObjectiveEvaluator),
//! and keeps the best. Attempts run in batches; after each batch the run stops
//! early if the best spread is already small enough. The winner is polished
//! by [`SurgicalSwapper`](surgical::SurgicalSwapper), which trades the
//! weakest team's weakest member for a strong member of a strong team.
//!
//! | preset                | attempts | early stop | surgical swaps | surgical stop |
//! |-----------------------|----------|------------|----------------|---------------|
//! | `quick`               | 15       | no         | 10             | spread ≤ 10%  |
//! | `super_balance`       | 200 / 15 | yes        | 25             | spread ≤ 10%  |
//! | `admin_rebalance`     | 15       | no         | 25             | never         |
//! | `admin_super_balance` | 200 / 15 | yes        | 50             | never         |
//!
//! Seeded runs are reproducible end to end: per-attempt seeds come from a
//! master generator seeded with the run seed.

pub mod formation;
pub mod optimizer;
pub mod pipeline;
pub mod rebalancer;
pub mod surgical;

/// Default early-stop threshold as a fraction of the global average skill.
pub const DEFAULT_SPREAD_THRESHOLD: f64 = 0.10;
