//! Typed content entries.
//!
//! Entries are plain values built by the caller (or deserialized from TOML)
//! and handed to a [`RegistryBuilder`](crate::reference::RegistryBuilder).
//! Nothing here registers itself.

mod spell;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use spell::*;

use crate::reference::{EntryId, Reference};

/// An entry in one of the lookup collections: damage types, schools,
/// conditions, ability scores, skills, monsters, items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: EntryId,
    #[serde(default)]
    pub name: Option<String>,
    /// Optional template
    #[serde(default)]
    pub desc: Option<String>,
    /// Named reference fields, e.g. a skill's `ability`
    #[serde(default)]
    pub links: BTreeMap<String, Reference>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: EntryId::new(id),
            name: None,
            desc: None,
            links: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    pub fn with_link(mut self, field: impl Into<String>, target: Reference) -> Self {
        self.links.insert(field.into(), target);
        self
    }
}

/// One authored entry
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Spell(Box<Spell>),
    Record(Record),
}

impl Entry {
    pub fn id(&self) -> &EntryId {
        match self {
            Entry::Spell(s) => &s.id,
            Entry::Record(r) => &r.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Entry::Spell(s) => Some(&s.name),
            Entry::Record(r) => r.name.as_deref(),
        }
    }

    /// Text a reference to this entry renders as: its name, else its id
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or_else(|| self.id().as_str())
    }

    pub fn as_spell(&self) -> Option<&Spell> {
        match self {
            Entry::Spell(s) => Some(s),
            Entry::Record(_) => None,
        }
    }
}

impl From<Spell> for Entry {
    fn from(spell: Spell) -> Self {
        Entry::Spell(Box::new(spell))
    }
}

impl From<Record> for Entry {
    fn from(record: Record) -> Self {
        Entry::Record(record)
    }
}
