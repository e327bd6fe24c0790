//! Resolution of every entry into the content graph

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::content::{Entry, Progression, ProgressionBasis, Record, Spell};
use crate::dice::{self, DiceExpression};
use crate::md::{ResolvedTemplate, Template};
use crate::reference::{CollectionName, EntryId, Reference, Registry, ResolveError};

use super::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use super::validate::check_spell;

/// A progression table with its formulas parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProgression {
    pub basis: ProgressionBasis,
    pub steps: Vec<(u32, DiceExpression)>,
}

impl ResolvedProgression {
    /// Dice for the highest step whose key is at or below `key`
    pub fn at(&self, key: u32) -> Option<&DiceExpression> {
        self.steps
            .iter()
            .take_while(|(at, _)| *at <= key)
            .last()
            .map(|(_, dice)| dice)
    }
}

/// An entry with its references looked up and its templates and formulas
/// parsed. Fields that failed keep their diagnostics instead of a value.
#[derive(Debug, Clone)]
pub struct ResolvedEntry {
    collection: CollectionName,
    entry: Arc<Entry>,
    valid: bool,
    diagnostics: Vec<Diagnostic>,
    references: BTreeMap<String, Option<Arc<Entry>>>,
    templates: BTreeMap<String, ResolvedTemplate>,
    dice: BTreeMap<String, DiceExpression>,
    progressions: BTreeMap<String, ResolvedProgression>,
}

impl ResolvedEntry {
    pub fn collection(&self) -> CollectionName {
        self.collection
    }

    pub fn id(&self) -> &EntryId {
        self.entry.id()
    }

    pub fn entry(&self) -> &Arc<Entry> {
        &self.entry
    }

    /// False when a required field failed to parse, a typed reference is
    /// dangling, or a structural rule is broken
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Target of a reference field such as `school` or
    /// `attack.damage[0].damageType`
    pub fn reference(&self, field: &str) -> Option<&Arc<Entry>> {
        self.references.get(field).and_then(Option::as_ref)
    }

    /// Reference fields in field order; `None` marks an unresolved one
    pub fn references(&self) -> impl Iterator<Item = (&str, Option<&Arc<Entry>>)> {
        self.references
            .iter()
            .map(|(field, target)| (field.as_str(), target.as_ref()))
    }

    pub fn template(&self, field: &str) -> Option<&ResolvedTemplate> {
        self.templates.get(field)
    }

    /// Rendered text of a template field
    pub fn rendered(&self, field: &str) -> Option<String> {
        self.template(field).map(ResolvedTemplate::render)
    }

    /// Parsed formula of a dice field such as `attack.damage[0].dice`
    pub fn dice(&self, field: &str) -> Option<&DiceExpression> {
        self.dice.get(field)
    }

    pub fn progression(&self, field: &str) -> Option<&ResolvedProgression> {
        self.progressions.get(field)
    }
}

/// The resolved snapshot of every registered collection
#[derive(Debug, Default)]
pub struct ContentGraph {
    entries: BTreeMap<CollectionName, BTreeMap<EntryId, ResolvedEntry>>,
    diagnostics: Vec<Diagnostic>,
}

impl ContentGraph {
    pub fn get(&self, collection: CollectionName, id: &str) -> Option<&ResolvedEntry> {
        self.entries.get(&collection).and_then(|t| t.get(id))
    }

    /// Every entry, valid or not, in (collection, id) order
    pub fn all(&self) -> impl Iterator<Item = &ResolvedEntry> {
        self.entries.values().flat_map(|t| t.values())
    }

    /// Entries fit for a renderer or rules engine
    pub fn valid(&self) -> impl Iterator<Item = &ResolvedEntry> {
        self.all().filter(|e| e.is_valid())
    }

    /// Entries of one collection in id order
    pub fn collection(&self, collection: CollectionName) -> impl Iterator<Item = &ResolvedEntry> {
        self.entries
            .get(&collection)
            .into_iter()
            .flat_map(|t| t.values())
    }

    /// Every diagnostic, sorted
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|t| t.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the content graph with default configuration
pub fn build_graph(registry: &Registry) -> ContentGraph {
    build_graph_with_config(registry, &BuildConfig::default())
}

/// Build the content graph.
///
/// Entries are resolved independently of each other against the frozen
/// registry. Registration errors and per-entry diagnostics are merged into
/// one sorted list, so the result does not depend on resolution order.
pub fn build_graph_with_config(registry: &Registry, config: &BuildConfig) -> ContentGraph {
    let work: Vec<(CollectionName, &Arc<Entry>)> = registry.entries().collect();
    let resolved = resolve_all(&work, registry, config);

    let mut diagnostics: Vec<Diagnostic> = registry
        .registration_errors()
        .iter()
        .map(Diagnostic::from)
        .collect();

    let mut entries: BTreeMap<CollectionName, BTreeMap<EntryId, ResolvedEntry>> = BTreeMap::new();
    for entry in resolved {
        if !entry.valid {
            tracing::debug!(collection = %entry.collection, id = %entry.id(), "entry marked invalid");
        }
        diagnostics.extend(entry.diagnostics.iter().cloned());
        entries
            .entry(entry.collection)
            .or_default()
            .insert(entry.id().clone(), entry);
    }
    diagnostics.sort();

    let graph = ContentGraph {
        entries,
        diagnostics,
    };
    tracing::info!(
        entries = graph.len(),
        valid = graph.valid().count(),
        diagnostics = graph.diagnostics.len(),
        "content graph built"
    );
    graph
}

fn resolve_all(
    work: &[(CollectionName, &Arc<Entry>)],
    registry: &Registry,
    config: &BuildConfig,
) -> Vec<ResolvedEntry> {
    #[cfg(feature = "parallel")]
    {
        if config.parallel {
            use rayon::prelude::*;
            return work
                .par_iter()
                .map(|(collection, entry)| resolve_entry(*collection, entry, registry, config))
                .collect();
        }
    }

    work.iter()
        .map(|(collection, entry)| resolve_entry(*collection, entry, registry, config))
        .collect()
}

/// Resolve one entry against the registry
pub fn resolve_entry(
    collection: CollectionName,
    entry: &Arc<Entry>,
    registry: &Registry,
    config: &BuildConfig,
) -> ResolvedEntry {
    let mut resolver = EntryResolver::new(collection, entry, registry, config);

    match entry.as_ref() {
        Entry::Spell(spell) => {
            if collection != CollectionName::Spells {
                resolver.structural(
                    "id",
                    format!("spell entries belong in spells, not {}", collection),
                );
            }
            resolver.spell(spell);
        }
        Entry::Record(record) => {
            if collection == CollectionName::Spells {
                resolver.structural("id", "spells collection holds a non-spell entry");
            }
            resolver.record(record);
        }
    }

    resolver.finish()
}

/// Per-entry state: everything resolved so far plus the diagnostics
struct EntryResolver<'a> {
    registry: &'a Registry,
    config: &'a BuildConfig,
    out: ResolvedEntry,
}

impl<'a> EntryResolver<'a> {
    fn new(
        collection: CollectionName,
        entry: &Arc<Entry>,
        registry: &'a Registry,
        config: &'a BuildConfig,
    ) -> Self {
        Self {
            registry,
            config,
            out: ResolvedEntry {
                collection,
                entry: Arc::clone(entry),
                valid: true,
                diagnostics: Vec::new(),
                references: BTreeMap::new(),
                templates: BTreeMap::new(),
                dice: BTreeMap::new(),
                progressions: BTreeMap::new(),
            },
        }
    }

    fn finish(mut self) -> ResolvedEntry {
        self.out.diagnostics.sort();
        self.out
    }

    fn report(
        &mut self,
        field: impl Into<String>,
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) {
        self.out.diagnostics.push(Diagnostic {
            collection: self.out.collection,
            entry_id: self.out.entry.id().clone(),
            field: field.into(),
            severity,
            kind,
            message: message.into(),
        });
    }

    fn structural(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.report(field, Severity::Error, DiagnosticKind::StructuralInvariant, message);
        self.out.valid = false;
    }

    fn spell(&mut self, spell: &Spell) {
        for finding in check_spell(spell, self.config) {
            if finding.severity == Severity::Error {
                self.out.valid = false;
            }
            self.report(
                finding.field,
                finding.severity,
                DiagnosticKind::StructuralInvariant,
                finding.message,
            );
        }

        self.reference("school", &spell.school, Some(CollectionName::MagicSchools));
        for (i, condition) in spell.conditions.iter().enumerate() {
            self.reference(
                format!("conditions[{}]", i),
                condition,
                Some(CollectionName::Conditions),
            );
        }

        if let Some(attack) = &spell.attack {
            if let Some(save) = &attack.save {
                self.reference("attack.save", save, Some(CollectionName::AbilityScores));
            }
            for (i, damage) in attack.damage.iter().enumerate() {
                self.dice(format!("attack.damage[{}].dice", i), &damage.dice);
                self.reference(
                    format!("attack.damage[{}].damageType", i),
                    &damage.damage_type,
                    Some(CollectionName::DamageTypes),
                );
            }
        }

        if let Some(p) = &spell.damage_progression {
            self.progression("damageProgression", p);
        }
        if let Some(p) = &spell.healing_progression {
            self.progression("healingProgression", p);
        }

        self.template("desc", &spell.desc, true);
        if let Some(higher) = &spell.higher_levels {
            self.template("higherLevels", higher, false);
        }
    }

    fn record(&mut self, record: &Record) {
        for (field, target) in &record.links {
            self.reference(format!("links.{}", field), target, None);
        }
        if let Some(desc) = &record.desc {
            self.template("desc", desc, false);
        }
    }

    /// Typed reference field: a miss invalidates the entry
    fn reference(
        &mut self,
        field: impl Into<String>,
        reference: &Reference,
        expected: Option<CollectionName>,
    ) {
        let field = field.into();
        let result = match expected {
            Some(expected) => self.registry.resolve_expecting(reference, expected),
            None => self.registry.resolve(reference),
        };

        let target = match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                let kind = match err {
                    ResolveError::NotFound { .. } => DiagnosticKind::DanglingReference,
                    ResolveError::WrongCollection { .. } => DiagnosticKind::WrongCollection,
                };
                self.report(field.clone(), Severity::Error, kind, err.to_string());
                self.out.valid = false;
                None
            }
        };
        self.out.references.insert(field, target);
    }

    /// Dice field; always required
    fn dice(&mut self, field: String, source: &str) -> Option<DiceExpression> {
        match dice::parse(source) {
            Ok(expr) => {
                self.out.dice.insert(field, expr.clone());
                Some(expr)
            }
            Err(err) => {
                self.report(
                    field,
                    Severity::Error,
                    DiagnosticKind::Parse,
                    format!("invalid dice '{}': {}", source, err),
                );
                self.out.valid = false;
                None
            }
        }
    }

    fn progression(&mut self, field: &str, progression: &Progression) {
        let mut steps = Vec::with_capacity(progression.steps.len());
        for (i, step) in progression.steps.iter().enumerate() {
            if let Some(expr) = self.dice(format!("{}.steps[{}].dice", field, i), &step.dice) {
                steps.push((step.at, expr));
            }
        }
        self.out.progressions.insert(
            field.to_string(),
            ResolvedProgression {
                basis: progression.basis,
                steps,
            },
        );
    }

    /// Template field. A parse error in a required template invalidates the
    /// entry; unresolved `%{ref}` directives never do.
    fn template(&mut self, field: &str, raw: &str, required: bool) {
        let template = match Template::parse(raw) {
            Ok(t) => t,
            Err(err) => {
                self.report(
                    field,
                    Severity::Error,
                    DiagnosticKind::Parse,
                    format!("{} (offsets into the normalized text)", err),
                );
                if required {
                    self.out.valid = false;
                }
                return;
            }
        };

        let resolved = template.resolve(self.registry);
        let severity = self.config.template_reference_severity;
        for failure in resolved.failures() {
            let kind = match failure.node {
                ResolveError::NotFound { .. } => DiagnosticKind::DanglingReference,
                ResolveError::WrongCollection { .. } => DiagnosticKind::WrongCollection,
            };
            self.report(
                field,
                severity,
                kind,
                format!(
                    "{} (directive at normalized offset {}..{})",
                    failure.node, failure.span.start, failure.span.end
                ),
            );
        }
        self.out.templates.insert(field.to_string(), resolved);
    }
}
