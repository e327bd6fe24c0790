//! Cross-collection references and the entry registry
//!
//! A [`Reference`] is a plain value naming a collection and an id. It can be
//! written before the collection it points into exists; a frozen
//! [`Registry`] answers whether the target is really there.
//!
//! # Example
//!
//! ```rust
//! use grimoire::content::Record;
//! use grimoire::reference::{ref_to, CollectionName, Registry};
//!
//! let school = ref_to(CollectionName::MagicSchools, "evocation");
//!
//! let mut builder = Registry::builder();
//! builder.register(CollectionName::MagicSchools, vec![Record::new("evocation")]);
//! let registry = builder.freeze();
//!
//! assert_eq!(registry.resolve(&school).unwrap().id().as_str(), "evocation");
//! ```

mod collection;
mod registry;

pub use collection::{ref_to, CollectionName, EntryId, Reference, UnknownCollection};
pub use registry::{Registry, RegistryBuilder, RegistryError, ResolveError, SourceLocation};
