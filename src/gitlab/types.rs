//! API resource models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Privilege tier of a group member, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AccessLevel {
    Guest = 10,
    Reporter = 20,
    Developer = 30,
    Master = 40,
    Owner = 50,
}

impl AccessLevel {
    /// Minimum level requested from the members endpoint
    pub const REMOVAL_THRESHOLD: AccessLevel = AccessLevel::Developer;

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for AccessLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(AccessLevel::Guest),
            20 => Ok(AccessLevel::Reporter),
            30 => Ok(AccessLevel::Developer),
            40 => Ok(AccessLevel::Master),
            50 => Ok(AccessLevel::Owner),
            other => Err(format!("unknown access level {other}")),
        }
    }
}

impl From<AccessLevel> for u8 {
    fn from(level: AccessLevel) -> Self {
        level.as_u8()
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AccessLevel::Guest => "guest",
            AccessLevel::Reporter => "reporter",
            AccessLevel::Developer => "developer",
            AccessLevel::Master => "master",
            AccessLevel::Owner => "owner",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_path: Option<String>,
}

impl Group {
    /// Whether `key` names this group by id, name, or full path
    pub fn matches(&self, key: &str) -> bool {
        key.parse::<u64>().map(|id| id == self.id).unwrap_or(false)
            || self.name == key
            || self.full_path.as_deref() == Some(key)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({})", self.name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    pub access_level: AccessLevel,
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.id)
    }
}
