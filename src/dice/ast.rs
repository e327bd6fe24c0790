//! Structured dice formulas

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Sign joining a term to the terms before it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    fn apply(self, value: i64) -> i64 {
        match self {
            Sign::Plus => value,
            Sign::Minus => -value,
        }
    }
}

/// A value bound by the caller when the formula is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// `MOD`: the caster's spellcasting ability modifier
    Modifier,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Modifier => "MOD",
        }
    }
}

impl FromStr for Symbol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOD" => Ok(Symbol::Modifier),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `NdS`, optionally followed by `× M` (roll, then multiply the result)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiceRoll {
    pub count: u32,
    pub sides: u32,
    pub multiplier: Option<u32>,
}

impl DiceRoll {
    pub fn new(count: u32, sides: u32) -> Self {
        Self {
            count,
            sides,
            multiplier: None,
        }
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    fn scale(&self) -> i64 {
        i64::from(self.multiplier.unwrap_or(1))
    }

    fn min(&self) -> Option<i64> {
        i64::from(self.count).checked_mul(self.scale())
    }

    fn max(&self) -> Option<i64> {
        i64::from(self.count)
            .checked_mul(i64::from(self.sides))?
            .checked_mul(self.scale())
    }

    fn average(&self) -> f64 {
        f64::from(self.count) * (f64::from(self.sides) + 1.0) / 2.0 * self.scale() as f64
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if let Some(m) = self.multiplier {
            write!(f, " × {}", m)?;
        }
        Ok(())
    }
}

/// One operand of a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Dice(DiceRoll),
    Flat(u32),
    Symbol(Symbol),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Dice(roll) => roll.fmt(f),
            Term::Flat(n) => write!(f, "{}", n),
            Term::Symbol(s) => s.fmt(f),
        }
    }
}

/// A term together with the operator that precedes it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedTerm {
    pub sign: Sign,
    pub term: Term,
}

/// A parsed dice formula.
///
/// Terms keep their source order and are never merged: `4d6 + 4d6` stays two
/// pools so a renderer can label them separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiceExpression {
    pub terms: Vec<SignedTerm>,
}

/// Values for the symbols of a formula
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<Symbol, i64>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `MOD`
    pub fn with_modifier(self, modifier: i64) -> Self {
        self.with(Symbol::Modifier, modifier)
    }

    pub fn with(mut self, symbol: Symbol, value: i64) -> Self {
        self.values.insert(symbol, value);
        self
    }

    pub fn get(&self, symbol: Symbol) -> Option<i64> {
        self.values.get(&symbol).copied()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("symbol {0} is not bound")]
    Unbound(Symbol),

    /// A total does not fit in an `i64`
    #[error("dice total overflows")]
    Overflow,
}

impl DiceExpression {
    /// Dice terms in source order
    pub fn dice_pools(&self) -> impl Iterator<Item = &DiceRoll> {
        self.terms.iter().filter_map(|t| match &t.term {
            Term::Dice(roll) => Some(roll),
            _ => None,
        })
    }

    /// Symbols the caller must bind before evaluating
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.terms.iter().filter_map(|t| match t.term {
            Term::Symbol(s) => Some(s),
            _ => None,
        })
    }

    /// Inclusive lowest and highest totals
    pub fn bounds(&self, bindings: &Bindings) -> Result<(i64, i64), EvalError> {
        let mut low = 0i64;
        let mut high = 0i64;
        for SignedTerm { sign, term } in &self.terms {
            let (lo, hi) = match term {
                Term::Dice(roll) => (
                    roll.min().ok_or(EvalError::Overflow)?,
                    roll.max().ok_or(EvalError::Overflow)?,
                ),
                Term::Flat(n) => (i64::from(*n), i64::from(*n)),
                Term::Symbol(s) => {
                    let v = bindings.get(*s).ok_or(EvalError::Unbound(*s))?;
                    (v, v)
                }
            };
            let (next_low, next_high) = match sign {
                Sign::Plus => (low.checked_add(lo), high.checked_add(hi)),
                Sign::Minus => (low.checked_sub(hi), high.checked_sub(lo)),
            };
            low = next_low.ok_or(EvalError::Overflow)?;
            high = next_high.ok_or(EvalError::Overflow)?;
        }
        Ok((low, high))
    }

    /// Expected total. Fails wherever [`bounds`](Self::bounds) fails.
    pub fn average(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        self.bounds(bindings)?;
        let mut total = 0.0;
        for SignedTerm { sign, term } in &self.terms {
            let value = match term {
                Term::Dice(roll) => roll.average(),
                Term::Flat(n) => f64::from(*n),
                Term::Symbol(s) => bindings.get(*s).ok_or(EvalError::Unbound(*s))? as f64,
            };
            total += sign.apply(1) as f64 * value;
        }
        Ok(total)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, SignedTerm { sign, term }) in self.terms.iter().enumerate() {
            match (i, sign) {
                (0, _) => {}
                (_, Sign::Plus) => f.write_str(" + ")?,
                (_, Sign::Minus) => f.write_str(" - ")?,
            }
            term.fmt(f)?;
        }
        Ok(())
    }
}
