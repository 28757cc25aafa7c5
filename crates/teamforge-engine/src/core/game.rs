use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Game a participant prefers to play.
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
)]
#[serde(try_from = "String")]
pub enum Game {
    Chess,
    #[display("FIFA")]
    #[serde(rename = "FIFA")]
    Fifa,
    Basketball,
    #[display("CS:GO")]
    #[serde(rename = "CS:GO")]
    CsGo,
    #[display("DOTA 2")]
    #[serde(rename = "DOTA 2")]
    Dota2,
    Valorant,
    Badminton,
}

impl Game {
    pub const LEN: usize = 7;
    pub const ALL: [Self; Self::LEN] = [
        Self::Chess,
        Self::Fifa,
        Self::Basketball,
        Self::CsGo,
        Self::Dota2,
        Self::Valorant,
        Self::Badminton,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid game: {input:?}")]
pub struct ParseGameError {
    #[error(not(source))]
    input: String,
}

impl FromStr for Game {
    type Err = ParseGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|game| game.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseGameError {
                input: s.to_owned(),
            })
    }
}

impl TryFrom<String> for Game {
    type Error = ParseGameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_names() {
        for game in Game::ALL {
            assert_eq!(game.to_string().parse::<Game>(), Ok(game));
        }
        assert_eq!("dota 2".parse::<Game>(), Ok(Game::Dota2));
        assert_eq!("cs:go".parse::<Game>(), Ok(Game::CsGo));
        assert!("Tetris".parse::<Game>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Game::CsGo).unwrap();
        assert_eq!(json, "\"CS:GO\"");
        let game: Game = serde_json::from_str("\"DOTA 2\"").unwrap();
        assert_eq!(game, Game::Dota2);
        let game: Game = serde_json::from_str("\"cs:go\"").unwrap();
        assert_eq!(game, Game::CsGo);
    }
}
