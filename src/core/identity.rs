//! Entity identifiers - `PREFIX-<ULID>`

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Entity type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityPrefix {
    Site,
    Dept,
    Prmr,
    Drop,
}

impl EntityPrefix {
    /// All known prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Site,
            EntityPrefix::Dept,
            EntityPrefix::Prmr,
            EntityPrefix::Drop,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Site => "SITE",
            EntityPrefix::Dept => "DEPT",
            EntityPrefix::Prmr => "PRMR",
            EntityPrefix::Drop => "DROP",
        }
    }

    /// Directory (relative to the project root) holding entities of this type
    pub fn dir(&self) -> &'static str {
        match self {
            EntityPrefix::Site => "reference/sites",
            EntityPrefix::Dept => "reference/departments",
            EntityPrefix::Prmr => "reference/primers",
            EntityPrefix::Drop => "drop-tests",
        }
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SITE" => Ok(EntityPrefix::Site),
            "DEPT" => Ok(EntityPrefix::Dept),
            "PRMR" => Ok(EntityPrefix::Prmr),
            "DROP" => Ok(EntityPrefix::Drop),
            _ => Err(IdParseError::UnknownPrefix(s.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("Invalid entity ID format: '{0}' (expected PREFIX-ULID)")]
    InvalidFormat(String),

    #[error("Unknown entity prefix: '{0}'")]
    UnknownPrefix(String),

    #[error("Invalid ULID in entity ID: '{0}'")]
    InvalidUlid(String),
}

/// A typed, globally unique entity ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Generate a new ID for the given entity type
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    pub fn ulid(&self) -> Ulid {
        self.ulid
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, ulid) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::InvalidFormat(s.to_string()))?;
        let prefix = prefix.parse()?;
        let ulid = Ulid::from_string(ulid).map_err(|_| IdParseError::InvalidUlid(s.to_string()))?;
        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_has_prefix() {
        let id = EntityId::new(EntityPrefix::Drop);
        assert!(id.to_string().starts_with("DROP-"));
        assert_eq!(id.to_string().len(), 31);
    }

    #[test]
    fn test_parse_roundtrip() {
        let id = EntityId::new(EntityPrefix::Prmr);
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert_eq!(parsed.prefix(), EntityPrefix::Prmr);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "nodash".parse::<EntityId>(),
            Err(IdParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            "REQ-01J0000000000000000000000".parse::<EntityId>(),
            Err(IdParseError::UnknownPrefix(_))
        ));
        assert!(matches!(
            "SITE-notaulid".parse::<EntityId>(),
            Err(IdParseError::InvalidUlid(_))
        ));
    }

    #[test]
    fn test_prefix_dirs_are_distinct() {
        let mut dirs: Vec<_> = EntityPrefix::all().iter().map(|p| p.dir()).collect();
        dirs.sort();
        dirs.dedup();
        assert_eq!(dirs.len(), EntityPrefix::all().len());
    }
}
