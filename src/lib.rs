//! Grimoire - references, dice formulas and rich-text templates for
//! tabletop rules content
//!
//! Content is authored as plain entries (spells and the lookup collections
//! they point into). This crate registers those entries, parses their dice
//! formulas and templates, resolves every cross-collection reference, and
//! reports whatever is wrong as sorted diagnostics.
//!
//! # Example
//!
//! ```rust
//! use grimoire::content::Record;
//! use grimoire::reference::{CollectionName, Registry};
//!
//! let mut builder = Registry::builder();
//! builder
//!     .register(CollectionName::DamageTypes, vec![Record::new("fire").with_name("Fire")])
//!     .register(
//!         CollectionName::Items,
//!         vec![Record::new("torch").with_desc("Deals %{dice 1d4} %{ref damageTypes fire} damage.")],
//!     );
//! let registry = builder.freeze();
//!
//! let graph = grimoire::build_graph(&registry);
//! assert!(graph.diagnostics().is_empty());
//!
//! let torch = graph.get(CollectionName::Items, "torch").unwrap();
//! assert_eq!(torch.rendered("desc").unwrap(), "Deals 1d4 Fire damage.");
//! ```

pub mod config;
pub mod content;
pub mod dice;
pub mod error;
pub mod md;
pub mod reference;
pub mod resolve;

pub use config::{BuildConfig, ConfigError};
pub use content::{Entry, Record, Spell};
pub use dice::{parse as parse_dice, DiceExpression};
pub use error::ParseError;
pub use md::{parse_template, ResolvedTemplate, Template};
pub use reference::{ref_to, CollectionName, EntryId, Reference, Registry, RegistryBuilder};
pub use resolve::{
    build_graph, build_graph_with_config, ContentGraph, Diagnostic, DiagnosticKind,
    ResolvedEntry, Severity,
};
