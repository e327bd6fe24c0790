//! Parsed templates and their resolution against a registry

use std::sync::Arc;

use crate::content::Entry;
use crate::dice::DiceExpression;
use crate::error::ParseError;
use crate::reference::{Registry, ResolveError};

use super::directive::parse_directive;
use super::node::{RefDirective, Spanned, TemplateNode};
use super::scanner::{normalize, scan, Segment};

/// A rich-text field split into literal runs and directives.
///
/// The node sequence is finite and can be walked any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    text: String,
    nodes: Vec<Spanned<TemplateNode>>,
}

/// Parse a raw template.
///
/// Any malformed directive rejects the whole template.
pub fn parse_template(raw: &str) -> Result<Template, ParseError> {
    Template::parse(raw)
}

impl Template {
    /// Normalize `raw`, then parse it. Spans refer to the normalized text.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let text = normalize(raw);
        let mut nodes = Vec::new();

        for segment in scan(&text)? {
            match segment {
                Segment::Literal(span) => {
                    nodes.push(Spanned::new(
                        TemplateNode::Literal(text[span.clone()].to_string()),
                        span,
                    ));
                }
                Segment::Directive { span, body } => {
                    let node = parse_directive(&text, span.clone(), body)?;
                    nodes.push(Spanned::new(node, span));
                }
            }
        }

        Ok(Self { text, nodes })
    }

    /// Normalized source text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn nodes(&self) -> &[Spanned<TemplateNode>] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &TemplateNode> {
        self.nodes.iter().map(|n| &n.node)
    }

    /// Reference directives in order
    pub fn references(&self) -> impl Iterator<Item = &RefDirective> {
        self.iter().filter_map(TemplateNode::as_ref_directive)
    }

    /// Un-substituted dice formulas in order, for renderers that bind `MOD`
    /// and roll
    pub fn dice(&self) -> impl Iterator<Item = &DiceExpression> {
        self.iter()
            .filter_map(TemplateNode::as_dice_directive)
            .map(|d| &d.expr)
    }

    /// Resolve every reference directive. Unresolved references are kept
    /// and reported; they never fail the template.
    pub fn resolve(self, registry: &Registry) -> ResolvedTemplate {
        let mut targets = Vec::with_capacity(self.nodes.len());
        let mut failures = Vec::new();

        for node in &self.nodes {
            let target = match &node.node {
                TemplateNode::Ref(r) => match registry.resolve(&r.reference) {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        failures.push(Spanned::new(err, node.span.clone()));
                        None
                    }
                },
                _ => None,
            };
            targets.push(target);
        }

        ResolvedTemplate {
            template: self,
            targets,
            failures,
        }
    }
}

impl<'a> IntoIterator for &'a Template {
    type Item = &'a TemplateNode;
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, Spanned<TemplateNode>>,
        fn(&'a Spanned<TemplateNode>) -> &'a TemplateNode,
    >;

    fn into_iter(self) -> Self::IntoIter {
        let node: fn(&'a Spanned<TemplateNode>) -> &'a TemplateNode = |n| &n.node;
        self.nodes.iter().map(node)
    }
}

/// A template whose references have been looked up
#[derive(Debug, Clone)]
pub struct ResolvedTemplate {
    template: Template,
    /// Parallel to the template's nodes; `Some` only for resolved references
    targets: Vec<Option<Arc<Entry>>>,
    failures: Vec<Spanned<ResolveError>>,
}

impl ResolvedTemplate {
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// References that did not resolve, with the span of their directive
    pub fn failures(&self) -> &[Spanned<ResolveError>] {
        &self.failures
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.failures.is_empty()
    }

    /// Each reference directive with its target, if found
    pub fn links(&self) -> impl Iterator<Item = (&RefDirective, Option<&Arc<Entry>>)> {
        self.template
            .nodes
            .iter()
            .zip(&self.targets)
            .filter_map(|(n, t)| n.node.as_ref_directive().map(|r| (r, t.as_ref())))
    }

    pub fn dice(&self) -> impl Iterator<Item = &DiceExpression> {
        self.template.dice()
    }

    /// Flat text with every directive substituted, in source order.
    ///
    /// Dice render as their normalized formula. References render as the
    /// display override, else the target's name; an unresolved reference
    /// without an override renders as the raw directive.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.text.len());
        for (node, target) in self.template.nodes.iter().zip(&self.targets) {
            match &node.node {
                TemplateNode::Literal(text) => out.push_str(text),
                TemplateNode::Dice(d) => out.push_str(&d.expr.to_string()),
                TemplateNode::Ref(r) => match (&r.display, target) {
                    (Some(display), _) => out.push_str(display),
                    (None, Some(entry)) => out.push_str(entry.display_name()),
                    (None, None) => out.push_str(&r.raw),
                },
            }
        }
        out
    }
}
