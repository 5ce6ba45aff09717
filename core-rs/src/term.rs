//! The opaque string tokens that make up triples and patterns.
//!
//! A [`Term`] is either a bound value (a CURIE, a bare identifier, or a
//! quoted literal — the store does not distinguish between them, they are
//! all just strings) or an unbound [`Term::Var`], written `?name` in
//! statements.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    /// A bound token: a CURIE like `rdf:type`, a bare identifier, or a
    /// quoted literal.
    Value(String),
    /// An unbound variable, e.g. `?x`.
    Var(String),
}

impl Term {
    pub fn value(s: impl Into<String>) -> Self {
        Term::Value(s.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// The raw token text, as it appears in a statement (`?x` for
    /// variables, the bare value otherwise).
    pub fn as_str(&self) -> &str {
        match self {
            Term::Value(s) => s,
            Term::Var(s) => s,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Value(s) => write!(f, "{}", s),
            Term::Var(name) => write!(f, "?{}", name),
        }
    }
}

impl From<&str> for Term {
    /// Parses the "is this a variable" rule once, from raw token text.
    fn from(token: &str) -> Self {
        match token.strip_prefix('?') {
            Some(name) => Term::Var(name.to_string()),
            None => Term::Value(token.to_string()),
        }
    }
}

impl From<String> for Term {
    fn from(token: String) -> Self {
        Term::from(token.as_str())
    }
}
