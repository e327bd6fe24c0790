//! Lexer for dice formulas using logos

use logos::Logos;

use crate::error::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum Lexeme {
    #[token("d")]
    D,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("×")]
    #[token("x")]
    #[token("*")]
    Times,

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<u32>().ok())]
    Int(u32),

    // Lower case is reserved for `d` and `x`, so symbols are upper case
    #[regex(r"[A-Z][A-Z0-9_]*", |lex| lex.slice().to_string())]
    Symbol(String),
}

/// Token stream fed to the grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Int(u32),
    Symbol(String),
    D,
    Plus,
    Minus,
    Times,
    /// Input the lexer could not match, kept so the parser can report it
    Error(String),
}

impl From<Lexeme> for Token {
    fn from(lexeme: Lexeme) -> Self {
        match lexeme {
            Lexeme::D => Token::D,
            Lexeme::Plus => Token::Plus,
            Lexeme::Minus => Token::Minus,
            Lexeme::Times => Token::Times,
            Lexeme::Int(n) => Token::Int(n),
            Lexeme::Symbol(s) => Token::Symbol(s),
        }
    }
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    let mut lexer = Lexeme::lexer(input);
    std::iter::from_fn(move || {
        let lexeme = lexer.next()?;
        let span = lexer.span();
        let token = match lexeme {
            Ok(l) => Token::from(l),
            Err(()) => Token::Error(input[span.clone()].to_string()),
        };
        Some((token, span))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_dice_term() {
        assert_eq!(tokens("3d8"), vec![Token::Int(3), Token::D, Token::Int(8)]);
        assert_eq!(tokens("d20"), vec![Token::D, Token::Int(20)]);
    }

    #[test]
    fn test_operators_and_symbols() {
        assert_eq!(
            tokens("1d8 + MOD - 2"),
            vec![
                Token::Int(1),
                Token::D,
                Token::Int(8),
                Token::Plus,
                Token::Symbol("MOD".to_string()),
                Token::Minus,
                Token::Int(2),
            ]
        );
    }

    #[test]
    fn test_multiplier_spellings() {
        assert_eq!(tokens("× x *"), vec![Token::Times, Token::Times, Token::Times]);
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let spans: Vec<_> = lex("1d4 × 10").map(|(_, s)| s).collect();
        assert_eq!(spans, vec![0..1, 1..2, 2..3, 4..6, 7..9]);
    }

    #[test]
    fn test_unmatched_input_becomes_error_token() {
        let toks = tokens("1d6 ?");
        assert_eq!(toks.last(), Some(&Token::Error("?".to_string())));
    }
}
