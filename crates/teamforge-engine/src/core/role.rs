use std::str::FromStr;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// In-game functional role a participant prefers to play.
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
pub enum Role {
    Strategist,
    Attacker,
    Defender,
    Supporter,
    Coordinator,
}

impl Role {
    pub const LEN: usize = 5;
    pub const ALL: [Self; Self::LEN] = [
        Self::Strategist,
        Self::Attacker,
        Self::Defender,
        Self::Supporter,
        Self::Coordinator,
    ];

    #[must_use]
    pub const fn as_index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid role: {input:?}")]
pub struct ParseRoleError {
    #[error(not(source))]
    input: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Parses a role name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseRoleError {
                input: s.to_owned(),
            })
    }
}

impl TryFrom<String> for Role {
    type Error = ParseRoleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Set of roles covered by a group of participants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleSet([bool; Role::LEN]);

impl RoleSet {
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.0[role.as_index()]
    }

    pub fn insert(&mut self, role: Role) {
        self.0[role.as_index()] = true;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.iter().filter(|present| **present).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Roles not in the set, in [`Role::ALL`] order.
    #[must_use]
    pub fn missing(&self) -> ArrayVec<Role, { Role::LEN }> {
        Role::ALL
            .into_iter()
            .filter(|role| !self.contains(*role))
            .collect()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        let mut set = Self::default();
        for role in iter {
            set.insert(role);
        }
        set
    }
}
