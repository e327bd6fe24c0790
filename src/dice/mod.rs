//! Dice notation: formula strings such as `"4d8 + MOD"` parsed into
//! structured expressions. Nothing here rolls dice.

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse;
