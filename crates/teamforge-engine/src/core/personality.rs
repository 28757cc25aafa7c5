use std::{
    fmt,
    ops::{Index, IndexMut},
};

use serde::{Deserialize, Serialize};

/// Scores below this value classify as [`PersonalityTier::Thinker`].
pub const BALANCED_THRESHOLD: u8 = 70;
/// Scores at or above this value classify as [`PersonalityTier::Leader`].
pub const LEADER_THRESHOLD: u8 = 90;

/// Personality bucket derived from a participant's questionnaire score.
///
/// The bands are fixed and non-decreasing:
///
/// | score            | tier     |
/// |------------------|----------|
/// | `< 70`           | Thinker  |
/// | `70..90`         | Balanced |
/// | `>= 90`          | Leader   |
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
pub enum PersonalityTier {
    Thinker,
    Balanced,
    Leader,
}

impl PersonalityTier {
    pub const LEN: usize = 3;
    pub const ALL: [Self; Self::LEN] = [Self::Thinker, Self::Balanced, Self::Leader];

    /// Classifies a personality score into its tier.
    ///
    /// This is total over `u8`: the 0–100 domain is validated by the caller
    /// (see [`Participant::new`](crate::Participant::new)), not here.
    ///
    /// # Examples
    ///
    /// ```
    /// use teamforge_engine::PersonalityTier;
    ///
    /// assert_eq!(PersonalityTier::from_score(12), PersonalityTier::Thinker);
    /// assert_eq!(PersonalityTier::from_score(70), PersonalityTier::Balanced);
    /// assert_eq!(PersonalityTier::from_score(95), PersonalityTier::Leader);
    /// ```
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score >= LEADER_THRESHOLD {
            Self::Leader
        } else if score >= BALANCED_THRESHOLD {
            Self::Balanced
        } else {
            Self::Thinker
        }
    }

    #[must_use]
    pub const fn as_index(self) -> usize {
        self as usize
    }
}

/// A value for each of the three personality tiers.
///
/// The tier set is closed, so grouping by tier is a fixed array rather than a map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByTier<T>([T; PersonalityTier::LEN]);

impl<T> ByTier<T> {
    #[must_use]
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(PersonalityTier) -> T,
    {
        Self(PersonalityTier::ALL.map(&mut f))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PersonalityTier, &T)> + '_ {
        PersonalityTier::ALL.into_iter().zip(&self.0)
    }

    pub fn into_values(self) -> impl Iterator<Item = T> {
        self.0.into_iter()
    }
}

impl<T> Index<PersonalityTier> for ByTier<T> {
    type Output = T;

    fn index(&self, tier: PersonalityTier) -> &T {
        &self.0[tier.as_index()]
    }
}

impl<T> IndexMut<PersonalityTier> for ByTier<T> {
    fn index_mut(&mut self, tier: PersonalityTier) -> &mut T {
        &mut self.0[tier.as_index()]
    }
}

/// Number of members in each tier.
pub type TierCounts = ByTier<usize>;

impl TierCounts {
    #[must_use]
    pub fn leaders(&self) -> usize {
        self[PersonalityTier::Leader]
    }

    #[must_use]
    pub fn thinkers(&self) -> usize {
        self[PersonalityTier::Thinker]
    }

    #[must_use]
    pub fn balanced(&self) -> usize {
        self[PersonalityTier::Balanced]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}

impl fmt::Display for TierCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "L{}/T{}/B{}",
            self.leaders(),
            self.thinkers(),
            self.balanced()
        )
    }
}
