//! Building the resolved content graph
//!
//! Every registered entry is resolved against the frozen registry: typed
//! references are looked up in the collection their field expects, dice and
//! template fields are parsed, and structural rules are checked. Problems
//! become [`Diagnostic`]s; no single bad entry aborts the build.

mod diagnostic;
mod graph;
mod validate;

pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use graph::{
    build_graph, build_graph_with_config, resolve_entry, ContentGraph, ResolvedEntry,
    ResolvedProgression,
};
