//! Error types for dice and template parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::dice::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed dice expression
    #[error("{message} at {}..{} ('{found}')", span.start, span.end)]
    Syntax {
        span: Span,
        found: String,
        message: String,
        expected: Vec<String>,
    },

    /// `%{` without a matching `}`
    #[error("unterminated directive at {}", span.start)]
    UnterminatedDirective { span: Span, found: String },

    /// Directive body that does not match any directive grammar
    #[error("invalid directive at {}..{} ('{found}'): {message}", span.start, span.end)]
    Directive {
        span: Span,
        found: String,
        message: String,
    },
}

impl ParseError {
    /// Byte range of the offending input
    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::UnterminatedDirective { span, .. }
            | ParseError::Directive { span, .. } => span,
        }
    }

    /// The offending substring
    pub fn found(&self) -> &str {
        match self {
            ParseError::Syntax { found, .. }
            | ParseError::UnterminatedDirective { found, .. }
            | ParseError::Directive { found, .. } => found,
        }
    }

    /// Shift the span by `by` bytes.
    ///
    /// Used when a dice expression embedded in a template is parsed on its
    /// own: the error then points into the template text.
    pub fn offset(mut self, by: usize) -> Self {
        match &mut self {
            ParseError::Syntax { span, .. }
            | ParseError::UnterminatedDirective { span, .. }
            | ParseError::Directive { span, .. } => {
                *span = span.start + by..span.end + by;
            }
        }
        self
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span().clone();
        let label = match self {
            ParseError::Syntax {
                message, expected, ..
            } if !expected.is_empty() => {
                format!("{}\nExpected: {}", message, expected.join(", "))
            }
            ParseError::Syntax { message, .. } | ParseError::Directive { message, .. } => {
                message.clone()
            }
            ParseError::UnterminatedDirective { .. } => "no closing '}' for this directive".into(),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((filename, span))
                    .with_message(label)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }

    /// Convert a chumsky error into a `ParseError` against the dice source
    pub(crate) fn from_rich(err: chumsky::error::Rich<'_, Token>, source: &str) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("unexpected {}", format_token(tok)),
                None => "unexpected end of input".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        let span = widen_at_end(err.span().into_range(), source);
        let found = source.get(span.clone()).unwrap_or_default().to_string();

        ParseError::Syntax {
            span,
            found,
            message,
            expected,
        }
    }
}

/// An empty span at end of input points at nothing; widen it back over the
/// dangling word (`1d`) or trailing operator (`1d6 +`) so the report shows
/// what was left unfinished.
fn widen_at_end(span: Span, source: &str) -> Span {
    if !span.is_empty() {
        return span;
    }
    let head = source.get(..span.start).unwrap_or(source).trim_end();
    if let Some((i, op)) = head.char_indices().next_back() {
        if matches!(op, '+' | '-' | '×' | 'x' | '*') {
            return i..head.len();
        }
    }
    let start = head
        .rfind(|c: char| c.is_whitespace() || matches!(c, '+' | '-'))
        .map(|i| i + 1)
        .unwrap_or(0);
    start..head.len()
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Int(n) => format!("number {}", n),
        Token::Symbol(s) => format!("symbol '{}'", s),
        Token::D => "'d'".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Times => "'×'".to_string(),
        Token::Error(s) => format!("'{}'", s),
    }
}
