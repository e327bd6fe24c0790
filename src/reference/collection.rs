//! Collection names, entry ids and the references between them

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of content collections
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CollectionName {
    Spells,
    Monsters,
    Conditions,
    DamageTypes,
    AbilityScores,
    Skills,
    MagicSchools,
    Items,
}

impl CollectionName {
    pub const ALL: [CollectionName; 8] = [
        CollectionName::Spells,
        CollectionName::Monsters,
        CollectionName::Conditions,
        CollectionName::DamageTypes,
        CollectionName::AbilityScores,
        CollectionName::Skills,
        CollectionName::MagicSchools,
        CollectionName::Items,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::Spells => "spells",
            CollectionName::Monsters => "monsters",
            CollectionName::Conditions => "conditions",
            CollectionName::DamageTypes => "damageTypes",
            CollectionName::AbilityScores => "abilityScores",
            CollectionName::Skills => "skills",
            CollectionName::MagicSchools => "magicSchools",
            CollectionName::Items => "items",
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionName::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown collection '{0}'")]
pub struct UnknownCollection(pub String);

/// Id of an entry, unique within its collection
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for EntryId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A deferred pointer to an entry in some collection.
///
/// Building one never consults a registry, so mutually referencing
/// collections can be authored in any order. Whether the target exists, and
/// whether it lives in the collection a field expects, is only checked when
/// the reference is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference {
    pub collection: CollectionName,
    pub id: EntryId,
}

impl Reference {
    pub fn new(collection: CollectionName, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: EntryId::new(id),
        }
    }
}

/// Shorthand for [`Reference::new`]
pub fn ref_to(collection: CollectionName, id: impl Into<String>) -> Reference {
    Reference::new(collection, id)
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}
