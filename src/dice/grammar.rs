//! Dice formula parser using chumsky
//!
//! ```text
//! expr     := term (('+' | '-') term)*
//! term     := diceTerm | INT | SYMBOL
//! diceTerm := [INT] 'd' INT [('×' | 'x' | '*') INT]
//! ```

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::dice::ast::*;
use crate::dice::lexer::{lex, Token};
use crate::error::ParseError;

/// Parse a dice formula such as `"4d8 + MOD"` or `"1d4 × 10"`
pub fn parse(input: &str) -> Result<DiceExpression, ParseError> {
    let len = input.len();

    let token_iter = lex(input).map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(err) => ParseError::from_rich(err, input),
            None => ParseError::Syntax {
                span: 0..len,
                found: input.to_string(),
                message: "invalid dice expression".to_string(),
                expected: Vec::new(),
            },
        })
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn expression_parser<'a, I>(
) -> impl Parser<'a, I, DiceExpression, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let int = select! {
        Token::Int(n) => n,
    }
    .map_with(|n, e| (n, span_range(&e.span())));

    // Count, `d` and sides form one word: `1 d 6` is rejected
    let dice_roll = int
        .clone()
        .or_not()
        .then(just(Token::D).map_with(|_, e| span_range(&e.span())))
        .then(int.clone())
        .try_map(|((count, d), (sides, sides_span)), span: SimpleSpan| {
            if let Some((_, count_span)) = &count {
                if count_span.end != d.start {
                    return Err(Rich::custom(span, "dice count must be written next to 'd'"));
                }
            }
            if d.end != sides_span.start {
                return Err(Rich::custom(span, "die size must be written next to 'd'"));
            }
            let count = count.map(|(n, _)| n).unwrap_or(1);
            if count == 0 {
                return Err(Rich::custom(span, "dice count must be at least 1"));
            }
            if sides == 0 {
                return Err(Rich::custom(span, "a die needs at least one side"));
            }
            Ok(DiceRoll::new(count, sides))
        })
        .then(just(Token::Times).ignore_then(int.clone()).or_not())
        .try_map(|(roll, multiplier), span: SimpleSpan| match multiplier {
            Some((0, _)) => Err(Rich::custom(span, "multiplier must be at least 1")),
            Some((m, _)) => Ok(roll.with_multiplier(m)),
            None => Ok(roll),
        });

    let symbol = select! {
        Token::Symbol(s) => s,
    }
    .try_map(|s: String, span: SimpleSpan| {
        s.parse::<Symbol>()
            .map_err(|_| Rich::custom(span, format!("unknown symbol '{}'", s)))
    });

    // Dice before flat numbers: both may start with an integer
    let term = choice((
        dice_roll.map(Term::Dice),
        int.map(|(n, _)| Term::Flat(n)),
        symbol.map(Term::Symbol),
    ));

    let sign = choice((
        just(Token::Plus).to(Sign::Plus),
        just(Token::Minus).to(Sign::Minus),
    ));

    term.clone()
        .then(
            sign.then(term)
                .map(|(sign, term)| SignedTerm { sign, term })
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
        .map(|(first, rest)| {
            let mut terms = Vec::with_capacity(rest.len() + 1);
            terms.push(SignedTerm {
                sign: Sign::Plus,
                term: first,
            });
            terms.extend(rest);
            DiceExpression { terms }
        })
}
