//! Template node types

use crate::dice::DiceExpression;
use crate::error::Span;
use crate::reference::Reference;

/// Node with its byte range in the normalized template text
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// `%{dice <expr>}`
#[derive(Debug, Clone, PartialEq)]
pub struct DiceDirective {
    pub expr: DiceExpression,
    /// The formula as written
    pub source: String,
}

/// `%{ref <collection> <id>[|<display>]}`
#[derive(Debug, Clone, PartialEq)]
pub struct RefDirective {
    pub reference: Reference,
    /// Rendered instead of the target's name
    pub display: Option<String>,
    /// The whole directive as written, used when nothing better is known
    pub raw: String,
}

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Literal(String),
    Dice(DiceDirective),
    Ref(RefDirective),
}

impl TemplateNode {
    pub fn as_ref_directive(&self) -> Option<&RefDirective> {
        match self {
            TemplateNode::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_dice_directive(&self) -> Option<&DiceDirective> {
        match self {
            TemplateNode::Dice(d) => Some(d),
            _ => None,
        }
    }
}
