use std::fmt;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for deterministic team formation.
///
/// A 128-bit seed initializing the [`Pcg32`] that drives every shuffle and
/// tie-break of one formation run. The same seed and the same participant
/// order reproduce the same teams.
///
/// Serialized as a 32-character lowercase hex string.
///
/// # Example
///
/// ```
/// use rand::Rng as _;
/// use teamforge_engine::FormationSeed;
///
/// let fixed = FormationSeed::from(42);
/// assert_eq!(fixed, FormationSeed::DEFAULT);
///
/// let random: FormationSeed = rand::rng().random();
/// # let _ = random;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormationSeed([u8; 16]);

impl FormationSeed {
    /// Seed used when a caller asks for deterministic mode without naming one.
    pub const DEFAULT: Self = Self(42u128.to_be_bytes());

    #[must_use]
    pub fn rng(self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }
}

impl From<u64> for FormationSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl fmt::Display for FormationSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl Serialize for FormationSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FormationSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<FormationSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FormationSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        FormationSeed(seed)
    }
}

/// Source of randomness for a formation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum RandomnessMode {
    /// Fresh entropy on every run; parallel slot building is allowed.
    Random,
    /// Reproducible run; slots are always built serially in slot order.
    Seeded(FormationSeed),
}

impl Default for RandomnessMode {
    fn default() -> Self {
        Self::Seeded(FormationSeed::DEFAULT)
    }
}

impl RandomnessMode {
    /// Random source for one run in this mode.
    #[must_use]
    pub fn rng(self) -> Pcg32 {
        match self {
            Self::Random => rand::rng().random::<FormationSeed>().rng(),
            Self::Seeded(seed) => seed.rng(),
        }
    }

    #[must_use]
    pub fn seed(self) -> Option<FormationSeed> {
        match self {
            Self::Random => None,
            Self::Seeded(seed) => Some(seed),
        }
    }
}

impl fmt::Display for RandomnessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Random => f.write_str("random"),
            Self::Seeded(seed) => write!(f, "seeded({seed})"),
        }
    }
}
