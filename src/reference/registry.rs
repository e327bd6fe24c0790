//! Registry for storing and looking up entries by collection and id

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::content::Entry;

use super::collection::{CollectionName, EntryId, Reference};

/// Where an entry was registered: an origin label and its index within it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    pub origin: String,
    pub index: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.origin, self.index)
    }
}

/// Errors raised while registering entries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Second entry with an id already present in the collection
    #[error("duplicate id '{id}' in {collection}: first registered at {first}, again at {duplicate}")]
    DuplicateId {
        collection: CollectionName,
        id: EntryId,
        first: SourceLocation,
        duplicate: SourceLocation,
    },
}

/// Errors raised while resolving a reference
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No entry with this id in the collection
    #[error("{reference} not found")]
    NotFound { reference: Reference },

    /// The reference points into a different collection than the field expects
    #[error("expected a reference into {expected}, found {reference}")]
    WrongCollection {
        expected: CollectionName,
        reference: Reference,
    },
}

#[derive(Debug, Clone)]
struct Registered {
    entry: Arc<Entry>,
    location: SourceLocation,
}

type Collections = BTreeMap<CollectionName, BTreeMap<EntryId, Registered>>;

/// Collects entries during the registration pass.
///
/// Call [`freeze`](Self::freeze) once every collection is registered; all
/// lookups happen on the frozen [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    collections: Collections,
    errors: Vec<RegistryError>,
    next_index: HashMap<String, usize>,
}

impl RegistryBuilder {
    /// Create a new empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register entries, labelling their locations with the collection name
    pub fn register<I>(&mut self, collection: CollectionName, entries: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Entry>,
    {
        self.register_from(collection.as_str(), collection, entries)
    }

    /// Register entries coming from `origin` (a module or file label used in
    /// duplicate-id reports).
    ///
    /// A duplicate id is recorded as an error and the entry dropped; the
    /// first registration wins and the rest of the batch still registers.
    pub fn register_from<I>(
        &mut self,
        origin: &str,
        collection: CollectionName,
        entries: I,
    ) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Entry>,
    {
        let index = self.next_index.entry(origin.to_string()).or_insert(0);
        let table = self.collections.entry(collection).or_default();
        let mut count = 0usize;

        for entry in entries {
            let entry: Entry = entry.into();
            let location = SourceLocation {
                origin: origin.to_string(),
                index: *index,
            };
            *index += 1;

            if let Some(existing) = table.get(entry.id()) {
                tracing::warn!(
                    %collection,
                    id = %entry.id(),
                    first = %existing.location,
                    duplicate = %location,
                    "duplicate entry id"
                );
                self.errors.push(RegistryError::DuplicateId {
                    collection,
                    id: entry.id().clone(),
                    first: existing.location.clone(),
                    duplicate: location,
                });
                continue;
            }

            table.insert(
                entry.id().clone(),
                Registered {
                    entry: Arc::new(entry),
                    location,
                },
            );
            count += 1;
        }

        tracing::debug!(%collection, origin, count, "registered entries");
        self
    }

    /// Finish registration
    pub fn freeze(self) -> Registry {
        Registry {
            collections: self.collections,
            errors: self.errors,
        }
    }
}

/// Read-only view of every registered entry.
///
/// Entries are stored behind `Arc`, so resolving the same reference twice
/// yields the same allocation (`Arc::ptr_eq`).
#[derive(Debug, Default)]
pub struct Registry {
    collections: Collections,
    errors: Vec<RegistryError>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Get an entry by collection and id
    pub fn get(&self, collection: CollectionName, id: &str) -> Option<&Arc<Entry>> {
        self.collections
            .get(&collection)
            .and_then(|t| t.get(id))
            .map(|r| &r.entry)
    }

    /// Where an entry was registered
    pub fn location(&self, collection: CollectionName, id: &str) -> Option<&SourceLocation> {
        self.collections
            .get(&collection)
            .and_then(|t| t.get(id))
            .map(|r| &r.location)
    }

    /// Look up the target of a reference
    pub fn resolve(&self, reference: &Reference) -> Result<Arc<Entry>, ResolveError> {
        self.get(reference.collection, reference.id.as_str())
            .cloned()
            .ok_or_else(|| ResolveError::NotFound {
                reference: reference.clone(),
            })
    }

    /// Look up a reference held by a field that only accepts `expected`
    pub fn resolve_expecting(
        &self,
        reference: &Reference,
        expected: CollectionName,
    ) -> Result<Arc<Entry>, ResolveError> {
        if reference.collection != expected {
            return Err(ResolveError::WrongCollection {
                expected,
                reference: reference.clone(),
            });
        }
        self.resolve(reference)
    }

    /// Entries of one collection in id order
    pub fn collection(&self, collection: CollectionName) -> impl Iterator<Item = &Arc<Entry>> {
        self.collections
            .get(&collection)
            .into_iter()
            .flat_map(|t| t.values().map(|r| &r.entry))
    }

    /// Every entry in (collection, id) order
    pub fn entries(&self) -> impl Iterator<Item = (CollectionName, &Arc<Entry>)> {
        self.collections
            .iter()
            .flat_map(|(c, t)| t.values().map(move |r| (*c, &r.entry)))
    }

    /// Errors recorded during registration
    pub fn registration_errors(&self) -> &[RegistryError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.collections.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
