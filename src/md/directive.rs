//! Second pass: parse one directive body against its own grammar

use crate::dice;
use crate::error::{ParseError, Span};
use crate::reference::{CollectionName, Reference};

use super::node::{DiceDirective, RefDirective, TemplateNode};

/// Parse the directive at `span` whose body (between `%{` and `}`) is at
/// `body`. Spans in errors are byte offsets into `text`.
pub(crate) fn parse_directive(text: &str, span: Span, body: Span) -> Result<TemplateNode, ParseError> {
    let raw = &text[span.clone()];
    let Some((kw_start, keyword)) = next_word(text, body.start, body.end) else {
        return Err(ParseError::Directive {
            span,
            found: raw.to_string(),
            message: "empty directive".to_string(),
        });
    };
    let args = kw_start + keyword.len()..body.end;

    match keyword {
        "dice" => parse_dice(text, args),
        "ref" => parse_ref(text, span, args),
        other => Err(ParseError::Directive {
            span: kw_start..kw_start + other.len(),
            found: other.to_string(),
            message: format!("unknown directive '{}', expected 'dice' or 'ref'", other),
        }),
    }
}

/// `dice <expr>`: the rest of the body goes to the dice parser verbatim
fn parse_dice(text: &str, args: Span) -> Result<TemplateNode, ParseError> {
    let source = &text[args.clone()];
    let expr = dice::parse(source).map_err(|e| e.offset(args.start))?;
    Ok(TemplateNode::Dice(DiceDirective {
        expr,
        source: source.trim().to_string(),
    }))
}

/// `ref <collection> <id>[|<display>]`
fn parse_ref(text: &str, span: Span, args: Span) -> Result<TemplateNode, ParseError> {
    let raw = &text[span.clone()];
    let directive_error = |message: &str| ParseError::Directive {
        span: span.clone(),
        found: raw.to_string(),
        message: message.to_string(),
    };

    let (coll_start, collection) =
        next_word(text, args.start, args.end).ok_or_else(|| directive_error("missing collection"))?;
    let collection: CollectionName = collection.parse().map_err(|e: crate::reference::UnknownCollection| {
        ParseError::Directive {
            span: coll_start..coll_start + e.0.len(),
            found: e.0.clone(),
            message: e.to_string(),
        }
    })?;

    let target = text[coll_start + collection.as_str().len()..args.end].trim();
    if target.is_empty() {
        return Err(directive_error("missing id"));
    }

    let (id, display) = match target.split_once('|') {
        Some((id, display)) => (id.trim(), Some(display.trim())),
        None => (target, None),
    };
    if id.is_empty() {
        return Err(directive_error("missing id"));
    }
    if id.contains(char::is_whitespace) {
        return Err(directive_error("id must be a single word"));
    }
    if display == Some("") {
        return Err(directive_error("empty display text after '|'"));
    }

    Ok(TemplateNode::Ref(RefDirective {
        reference: Reference::new(collection, id),
        display: display.map(str::to_string),
        raw: raw.to_string(),
    }))
}

/// First whitespace-delimited word of `text[start..end]` and its offset
fn next_word(text: &str, start: usize, end: usize) -> Option<(usize, &str)> {
    let region = &text[start..end];
    let word_start = region.find(|c: char| !c.is_whitespace())?;
    let rest = &region[word_start..];
    let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some((start + word_start, &rest[..len]))
}
