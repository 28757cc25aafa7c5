use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use rand::{Rng, seq::SliceRandom as _};

use crate::{ByTier, Participant, PersonalityTier};

/// Per-run partition of participants into one shuffled queue per tier.
///
/// The pool never owns participants: it holds indices into the caller's slice
/// (the arena). Every claim removes an index under its tier's lock, so a
/// participant can be handed out at most once even when several builders
/// claim concurrently.
///
/// # Example
///
/// ```
/// use teamforge_engine::{CandidatePool, FormationSeed, Game, Participant, PersonalityTier, Role};
///
/// let participants = vec![
///     Participant::new("P1", "A", "a@x", Game::Chess, 4, Role::Strategist, 95)?,
///     Participant::new("P2", "B", "b@x", Game::Fifa, 6, Role::Attacker, 20)?,
/// ];
/// let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
///
/// let leader = pool.claim_front(PersonalityTier::Leader).unwrap();
/// assert_eq!(leader.id().as_str(), "P1");
/// assert!(pool.claim_front(PersonalityTier::Leader).is_none());
/// assert_eq!(pool.len(), 1);
/// # Ok::<(), teamforge_engine::ParticipantError>(())
/// ```
#[derive(Debug)]
pub struct CandidatePool<'a> {
    arena: &'a [Participant],
    queues: ByTier<Mutex<VecDeque<usize>>>,
}

impl<'a> CandidatePool<'a> {
    /// Partitions `arena` by tier and shuffles each queue with `rng`.
    ///
    /// Queues are shuffled in [`PersonalityTier::ALL`] order, so the consumed
    /// random stream depends only on the input order and the tier sizes.
    pub fn new<R>(arena: &'a [Participant], rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut groups: ByTier<Vec<usize>> = ByTier::default();
        for (index, participant) in arena.iter().enumerate() {
            groups[participant.personality_tier()].push(index);
        }
        for tier in PersonalityTier::ALL {
            groups[tier].shuffle(rng);
        }
        let queues = ByTier::from_fn(|tier| {
            Mutex::new(std::mem::take(&mut groups[tier]).into_iter().collect())
        });
        Self { arena, queues }
    }

    fn lock(&self, tier: PersonalityTier) -> MutexGuard<'_, VecDeque<usize>> {
        // A claim never leaves a queue half-modified, so a poisoned lock is still consistent.
        self.queues[tier]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn take(&self, queue: &mut VecDeque<usize>, pos: usize) -> Option<Participant> {
        queue.remove(pos).map(|index| self.arena[index].clone())
    }

    /// Number of participants still queued in `tier`.
    #[must_use]
    pub fn tier_len(&self, tier: PersonalityTier) -> usize {
        self.lock(tier).len()
    }

    /// Number of participants still queued across all tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        PersonalityTier::ALL
            .into_iter()
            .map(|tier| self.tier_len(tier))
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Claims the admissible candidate of `tier` whose skill is closest to `target`.
    ///
    /// Ties go to the candidate nearer the front of the queue. If no queued
    /// candidate is admissible, the front of the queue is claimed instead.
    pub fn claim_closest<F>(
        &self,
        tier: PersonalityTier,
        target: f64,
        mut admissible: F,
    ) -> Option<Participant>
    where
        F: FnMut(&Participant) -> bool,
    {
        let mut queue = self.lock(tier);
        let mut best: Option<(usize, f64)> = None;
        for (pos, &index) in queue.iter().enumerate() {
            let candidate = &self.arena[index];
            if !admissible(candidate) {
                continue;
            }
            let diff = (f64::from(candidate.skill_level()) - target).abs();
            if best.is_none_or(|(_, best_diff)| diff < best_diff) {
                best = Some((pos, diff));
            }
        }
        let pos = best.map_or(0, |(pos, _)| pos);
        self.take(&mut queue, pos)
    }

    /// Claims the front of the `tier` queue.
    pub fn claim_front(&self, tier: PersonalityTier) -> Option<Participant> {
        self.lock(tier).pop_front().map(|index| self.arena[index].clone())
    }

    /// Claims the first queued candidate of `tier` for which `f` returns `Some`,
    /// in queue order, together with that value.
    ///
    /// `f` runs under the tier lock, so the returned value was computed against
    /// a candidate nobody else could claim in the meantime.
    pub fn claim_find_map<F, T>(&self, tier: PersonalityTier, mut f: F) -> Option<(Participant, T)>
    where
        F: FnMut(&Participant) -> Option<T>,
    {
        let mut queue = self.lock(tier);
        let (pos, value) = queue
            .iter()
            .enumerate()
            .find_map(|(pos, &index)| f(&self.arena[index]).map(|value| (pos, value)))?;
        let participant = self.take(&mut queue, pos)?;
        Some((participant, value))
    }

    /// Claims the front of the first non-empty queue among `tiers`, tried in order.
    pub fn claim_any<I>(&self, tiers: I) -> Option<Participant>
    where
        I: IntoIterator<Item = PersonalityTier>,
    {
        tiers.into_iter().find_map(|tier| self.claim_front(tier))
    }

    /// Everything still queued, in tier order (Thinker, Balanced, Leader) and
    /// queue order within a tier.
    #[must_use]
    pub fn into_remaining(self) -> Vec<Participant> {
        let arena = self.arena;
        self.queues
            .into_values()
            .flat_map(|queue| queue.into_inner().unwrap_or_else(PoisonError::into_inner))
            .map(|index| arena[index].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, thread};

    use crate::{FormationSeed, Game, Role};

    use super::*;

    fn participant(id: usize, skill: u8, score: u8) -> Participant {
        Participant::new(
            format!("P{id:02}"),
            format!("Player {id}"),
            format!("p{id}@example.edu"),
            Game::ALL[id % Game::LEN],
            skill,
            Role::ALL[id % Role::LEN],
            score,
        )
        .unwrap()
    }

    fn mixed(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| {
                let score = [95, 40, 75][i % 3];
                let skill = u8::try_from(i % 10).unwrap() + 1;
                participant(i, skill, score)
            })
            .collect()
    }

    #[test]
    fn test_every_participant_lands_in_its_tier() {
        let participants = mixed(30);
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        assert_eq!(pool.len(), 30);
        for tier in PersonalityTier::ALL {
            assert_eq!(pool.tier_len(tier), 10);
        }
        let remaining = pool.into_remaining();
        let ids: BTreeSet<_> = remaining.iter().map(|p| p.id().clone()).collect();
        assert_eq!(ids.len(), 30);
        // Tier order of the drained list.
        assert!(remaining[..10].iter().all(|p| p.personality_tier().is_thinker()));
        assert!(remaining[20..].iter().all(|p| p.personality_tier().is_leader()));
    }

    #[test]
    fn test_same_seed_same_order() {
        let participants = mixed(30);
        let order = |seed: u64| {
            CandidatePool::new(&participants, &mut FormationSeed::from(seed).rng())
                .into_remaining()
                .into_iter()
                .map(|p| p.id().clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(order(42), order(42));
        assert_ne!(order(42), order(43));
    }

    #[test]
    fn test_claim_closest_prefers_target_skill() {
        let participants = vec![
            participant(0, 2, 40),
            participant(1, 9, 40),
            participant(2, 6, 40),
        ];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let p = pool
            .claim_closest(PersonalityTier::Thinker, 5.5, |_| true)
            .unwrap();
        assert_eq!(p.skill_level(), 6);
        let p = pool
            .claim_closest(PersonalityTier::Thinker, 5.5, |p| p.skill_level() > 5)
            .unwrap();
        assert_eq!(p.skill_level(), 9);
        // Nothing admissible: falls back to the front.
        let p = pool
            .claim_closest(PersonalityTier::Thinker, 5.5, |_| false)
            .unwrap();
        assert_eq!(p.skill_level(), 2);
        assert!(
            pool.claim_closest(PersonalityTier::Thinker, 5.5, |_| true)
                .is_none()
        );
    }

    #[test]
    fn test_claim_any_tries_tiers_in_order() {
        let participants = vec![participant(0, 5, 40), participant(1, 5, 75)];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let p = pool
            .claim_any([PersonalityTier::Leader, PersonalityTier::Balanced])
            .unwrap();
        assert!(p.personality_tier().is_balanced());
        assert!(
            pool.claim_any([PersonalityTier::Leader, PersonalityTier::Balanced])
                .is_none()
        );
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_claim_find_map_returns_value() {
        let participants = vec![participant(0, 3, 75), participant(1, 8, 75)];
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let (p, doubled) = pool
            .claim_find_map(PersonalityTier::Balanced, |p| {
                (p.skill_level() > 5).then(|| p.skill_level() * 2)
            })
            .unwrap();
        assert_eq!(p.skill_level(), 8);
        assert_eq!(doubled, 16);
        assert!(
            pool.claim_find_map(PersonalityTier::Balanced, |p| {
                (p.skill_level() > 5).then_some(())
            })
            .is_none()
        );
        assert_eq!(pool.tier_len(PersonalityTier::Balanced), 1);
    }

    #[test]
    fn test_concurrent_claims_are_exclusive() {
        let participants = mixed(300);
        let pool = CandidatePool::new(&participants, &mut FormationSeed::DEFAULT.rng());
        let claimed: Vec<Participant> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let mut mine = vec![];
                        while let Some(p) = pool.claim_any(PersonalityTier::ALL) {
                            mine.push(p);
                        }
                        mine
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let ids: BTreeSet<_> = claimed.iter().map(|p| p.id().clone()).collect();
        assert_eq!(claimed.len(), 300);
        assert_eq!(ids.len(), 300);
        assert!(pool.is_empty());
    }
}
