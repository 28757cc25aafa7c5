use serde::{Deserialize, Serialize};

use super::{game::Game, personality::PersonalityTier, role::Role};

pub const MIN_SKILL: u8 = 1;
pub const MAX_SKILL: u8 = 10;
pub const MAX_PERSONALITY_SCORE: u8 = 100;

/// Stable unique identifier of a participant.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl ParticipantId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParticipantError {
    #[display("skill level {_0} out of range {MIN_SKILL}..={MAX_SKILL}")]
    SkillOutOfRange(#[error(not(source))] u8),
    #[display("personality score {_0} out of range 0..={MAX_PERSONALITY_SCORE}")]
    ScoreOutOfRange(#[error(not(source))] u8),
}

/// A person to be seated into a team.
///
/// The personality tier is derived from the score on every read, so it always
/// agrees with the current score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParticipantRecord")]
pub struct Participant {
    id: ParticipantId,
    name: String,
    email: String,
    preferred_game: Game,
    skill_level: u8,
    preferred_role: Role,
    personality_score: u8,
}

impl Participant {
    /// Creates a participant, validating skill (1–10) and personality score (0–100).
    ///
    /// # Examples
    ///
    /// ```
    /// use teamforge_engine::{Game, Participant, PersonalityTier, Role};
    ///
    /// let (game, role) = (Game::Chess, Role::Strategist);
    /// let p = Participant::new("P001", "Ada", "ada@example.edu", game, 5, role, 95)?;
    /// assert_eq!(p.personality_tier(), PersonalityTier::Leader);
    ///
    /// let too_skilled =
    ///     Participant::new("P002", "Bob", "bob@example.edu", Game::Chess, 11, Role::Attacker, 50);
    /// assert!(too_skilled.is_err());
    /// # Ok::<(), teamforge_engine::ParticipantError>(())
    /// ```
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        email: impl Into<String>,
        preferred_game: Game,
        skill_level: u8,
        preferred_role: Role,
        personality_score: u8,
    ) -> Result<Self, ParticipantError> {
        validate_skill(skill_level)?;
        validate_score(personality_score)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            preferred_game,
            skill_level,
            preferred_role,
            personality_score,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn preferred_game(&self) -> Game {
        self.preferred_game
    }

    #[must_use]
    pub fn skill_level(&self) -> u8 {
        self.skill_level
    }

    #[must_use]
    pub fn preferred_role(&self) -> Role {
        self.preferred_role
    }

    #[must_use]
    pub fn personality_score(&self) -> u8 {
        self.personality_score
    }

    #[must_use]
    pub fn personality_tier(&self) -> PersonalityTier {
        PersonalityTier::from_score(self.personality_score)
    }

    pub fn set_personality_score(&mut self, score: u8) -> Result<(), ParticipantError> {
        validate_score(score)?;
        self.personality_score = score;
        Ok(())
    }
}

fn validate_skill(skill: u8) -> Result<(), ParticipantError> {
    if (MIN_SKILL..=MAX_SKILL).contains(&skill) {
        Ok(())
    } else {
        Err(ParticipantError::SkillOutOfRange(skill))
    }
}

fn validate_score(score: u8) -> Result<(), ParticipantError> {
    if score <= MAX_PERSONALITY_SCORE {
        Ok(())
    } else {
        Err(ParticipantError::ScoreOutOfRange(score))
    }
}

/// Unvalidated wire shape; deserialization goes through [`Participant::new`].
#[derive(Deserialize)]
struct ParticipantRecord {
    id: ParticipantId,
    name: String,
    email: String,
    preferred_game: Game,
    skill_level: u8,
    preferred_role: Role,
    personality_score: u8,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = ParticipantError;

    fn try_from(record: ParticipantRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.id,
            record.name,
            record.email,
            record.preferred_game,
            record.skill_level,
            record.preferred_role,
            record.personality_score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: u8) -> Participant {
        Participant::new(
            "P001",
            "Test User",
            "test@example.edu",
            Game::Chess,
            5,
            Role::Strategist,
            score,
        )
        .unwrap()
    }

    #[test]
    fn test_tier_follows_score() {
        let mut p = sample(95);
        assert_eq!(p.personality_tier(), PersonalityTier::Leader);
        p.set_personality_score(40).unwrap();
        assert_eq!(p.personality_tier(), PersonalityTier::Thinker);
        assert!(p.set_personality_score(101).is_err());
        assert_eq!(p.personality_score(), 40);
    }

    #[test]
    fn test_rejects_out_of_range_skill() {
        for skill in [0, 11] {
            let result = Participant::new("P", "N", "e", Game::Fifa, skill, Role::Attacker, 50);
            assert_eq!(result, Err(ParticipantError::SkillOutOfRange(skill)));
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "id": "P9", "name": "N", "email": "n@example.edu",
            "preferred_game": "Valorant", "skill_level": 7,
            "preferred_role": "Defender", "personality_score": 75
        }"#;
        let p: Participant = serde_json::from_str(json).unwrap();
        assert_eq!(p.id().as_str(), "P9");
        assert_eq!(p.personality_tier(), PersonalityTier::Balanced);

        let bad = json.replace("\"skill_level\": 7", "\"skill_level\": 0");
        let err = serde_json::from_str::<Participant>(&bad).unwrap_err();
        assert!(err.to_string().contains("skill level 0"));
    }

    #[test]
    fn test_deserialize_ignores_name_case() {
        let json = r#"{
            "id": "P7", "name": "N", "email": "n@example.edu",
            "preferred_game": "dota 2", "skill_level": 4,
            "preferred_role": "attacker", "personality_score": 60
        }"#;
        let p: Participant = serde_json::from_str(json).unwrap();
        assert_eq!(p.preferred_game(), Game::Dota2);
        assert_eq!(p.preferred_role(), Role::Attacker);

        let bad = json.replace("attacker", "goalkeeper");
        let err = serde_json::from_str::<Participant>(&bad).unwrap_err();
        assert!(err.to_string().contains("invalid role"), "{err}");
    }

    #[test]
    fn test_serialize_roundtrip_preserves_fields() {
        let p = sample(80);
        let json = serde_json::to_string(&p).unwrap();
        let back: Participant = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
