//! First pass over a template: normalize the text and split it into
//! literal runs and `%{...}` directive spans. Directive bodies are parsed
//! separately (see `directive.rs`).

use crate::error::{ParseError, Span};

const OPEN: &str = "%{";
const CLOSE: char = '}';

/// Literal run or directive, as byte ranges into the normalized text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Literal(Span),
    Directive { span: Span, body: Span },
}

/// Undo the indentation of a template written as an indented literal block.
///
/// Leading and trailing blank lines are dropped, the indentation common to
/// every non-blank line is stripped, and whitespace-only lines become empty.
pub fn normalize(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();
    let is_blank = |l: &&str| l.trim().is_empty();

    let Some(first) = lines.iter().position(|l| !is_blank(l)) else {
        return String::new();
    };
    let last = lines.iter().rposition(|l| !is_blank(l)).unwrap_or(first);
    let body = &lines[first..=last];

    // Only ASCII space and tab count, so slicing stays on char boundaries
    let indent_of = |l: &str| l.len() - l.trim_start_matches([' ', '\t']).len();
    let indent = body
        .iter()
        .filter(|l| !is_blank(*l))
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);

    body.iter()
        .map(|l| if is_blank(l) { "" } else { &l[indent..] })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split normalized text into segments.
///
/// Directives do not nest: the body runs to the first `}`. A `%{` with no
/// `}` after it rejects the whole template.
pub(crate) fn scan(text: &str) -> Result<Vec<Segment>, ParseError> {
    let mut segments = Vec::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find(OPEN) {
        let open = pos + rel;
        if open > pos {
            segments.push(Segment::Literal(pos..open));
        }

        let body_start = open + OPEN.len();
        let Some(close_rel) = text[body_start..].find(CLOSE) else {
            return Err(ParseError::UnterminatedDirective {
                span: open..text.len(),
                found: text[open..].to_string(),
            });
        };
        let close = body_start + close_rel;

        segments.push(Segment::Directive {
            span: open..close + 1,
            body: body_start..close,
        });
        pos = close + 1;
    }

    if pos < text.len() {
        segments.push(Segment::Literal(pos..text.len()));
    }
    Ok(segments)
}
