//! Rule-based field recognition for invoice text.

pub mod amounts;
pub mod patterns;

pub use amounts::{normalize, round_to, AMOUNT_PRECISION, RATE_PRECISION};

use regex::Regex;

use crate::error::{FxrError, Result};

/// How many lines may match a field's pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one line must match; none or several is not a value.
    ExactlyOne,
}

/// A named field recognized by a line pattern.
///
/// The first capture group of the pattern holds the raw value.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    name: &'static str,
    pattern: Regex,
    arity: Arity,
}

/// Result of matching one field against a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A single line matched; holds the captured token.
    Found(String),
    /// No line matched.
    Absent,
    /// Several lines matched.
    Ambiguous(usize),
}

impl MatchOutcome {
    /// Number of lines that matched.
    pub fn match_count(&self) -> usize {
        match self {
            MatchOutcome::Found(_) => 1,
            MatchOutcome::Absent => 0,
            MatchOutcome::Ambiguous(n) => *n,
        }
    }
}

impl FieldSpec {
    /// Compile `pattern` into a field spec.
    pub fn new(name: &'static str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| FxrError::Config(format!("invalid pattern for {}: {}", name, e)))?;
        Self::from_regex(name, regex)
    }

    /// Wrap an already compiled pattern. It must have a capture group.
    pub fn from_regex(name: &'static str, pattern: Regex) -> Result<Self> {
        // captures_len counts the implicit whole-match group
        if pattern.captures_len() < 2 {
            return Err(FxrError::Config(format!(
                "pattern for {} has no capture group: {}",
                name,
                pattern.as_str()
            )));
        }

        Ok(Self {
            name,
            pattern,
            arity: Arity::ExactlyOne,
        })
    }

    /// The built-in USD/EUR exchange rate field.
    pub fn exchange_rate() -> Self {
        Self {
            name: "exchange_rate",
            pattern: patterns::USD_EUR_RATE.clone(),
            arity: Arity::ExactlyOne,
        }
    }

    /// The built-in USD total amount field.
    pub fn total_amount() -> Self {
        Self {
            name: "total_amount",
            pattern: patterns::TOTAL_USD.clone(),
            arity: Arity::ExactlyOne,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Match this field against document lines.
    pub fn find<S: AsRef<str>>(&self, lines: &[S]) -> MatchOutcome {
        match_field(lines, self)
    }
}

/// Find the single line matching `spec` and extract its first capture group.
pub fn match_field<S: AsRef<str>>(lines: &[S], spec: &FieldSpec) -> MatchOutcome {
    let matching: Vec<&str> = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| spec.pattern.is_match(line))
        .collect();

    match (spec.arity, matching.as_slice()) {
        (_, []) => MatchOutcome::Absent,
        (Arity::ExactlyOne, [line]) => {
            let token = spec
                .pattern
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map_or("", |m| m.as_str());
            MatchOutcome::Found(token.to_string())
        }
        (Arity::ExactlyOne, many) => MatchOutcome::Ambiguous(many.len()),
    }
}
