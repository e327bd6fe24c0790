//! Diagnostics reported while building the content graph

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reference::{CollectionName, EntryId, RegistryError};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Category of problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// Malformed dice formula or template
    Parse,
    /// Reference to an entry that is not registered
    DanglingReference,
    /// Reference into a collection the field does not accept
    WrongCollection,
    /// Id registered twice in one collection
    DuplicateId,
    /// Entry breaks a structural rule (empty durations, unordered table, ...)
    StructuralInvariant,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Parse => write!(f, "parse"),
            DiagnosticKind::DanglingReference => write!(f, "dangling-reference"),
            DiagnosticKind::WrongCollection => write!(f, "wrong-collection"),
            DiagnosticKind::DuplicateId => write!(f, "duplicate-id"),
            DiagnosticKind::StructuralInvariant => write!(f, "structural"),
        }
    }
}

/// One problem found in one field of one entry.
///
/// Ordering is by location first (collection, id, field), so a sorted list
/// reads entry by entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub collection: CollectionName,
    pub entry_id: EntryId,
    pub field: String,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {}/{} {}: {}",
            self.severity, self.kind, self.collection, self.entry_id, self.field, self.message
        )
    }
}

impl From<&RegistryError> for Diagnostic {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::DuplicateId { collection, id, .. } => Diagnostic {
                collection: *collection,
                entry_id: id.clone(),
                field: "id".to_string(),
                severity: Severity::Error,
                kind: DiagnosticKind::DuplicateId,
                message: err.to_string(),
            },
        }
    }
}
