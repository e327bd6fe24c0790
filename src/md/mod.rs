//! Rich-text templates
//!
//! Template fields mix prose with `%{...}` directives:
//!
//! ```text
//! Each creature takes %{dice 8d6} %{ref damageTypes fire} damage,
//! or half as much on a successful save. Fire %{ref items arrow|arrows}.
//! ```
//!
//! Parsing happens in two passes: the scanner splits the normalized text
//! into literal runs and directive spans, then each directive body is parsed
//! against its own grammar (`dice` bodies by [`crate::dice::parse`]).
//! Reference resolution is a separate step against a frozen
//! [`Registry`](crate::reference::Registry).
//!
//! # Example
//!
//! ```rust
//! use grimoire::md::parse_template;
//! use grimoire::reference::Registry;
//!
//! let template = parse_template("Deal %{dice 3d6} fire damage.").unwrap();
//! let resolved = template.resolve(&Registry::default());
//! assert_eq!(resolved.render(), "Deal 3d6 fire damage.");
//! ```

mod directive;
mod node;
mod scanner;
mod template;

pub use node::{DiceDirective, RefDirective, Spanned, TemplateNode};
pub use scanner::normalize;
pub use template::{parse_template, ResolvedTemplate, Template};
