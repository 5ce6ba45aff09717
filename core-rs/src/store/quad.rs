//! The stored quad and the ground triple / pattern types built on [`Term`].

use crate::term::Term;
use chrono::{DateTime, Utc};
use std::fmt;

/// A ground triple: the subject/predicate/object of a statement a client
/// asserts, retracts or updates. Never contains a [`Term::Var`] — callers
/// that need variables use [`Pattern`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A triple where any position may be a variable (spec.md §3 "Pattern").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Pattern {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self { subject, predicate, object }
    }

    /// Number of distinct variable positions in this pattern.
    pub fn num_variables(&self) -> usize {
        [&self.subject, &self.predicate, &self.object]
            .iter()
            .filter(|t| t.is_var())
            .count()
    }

    /// Every distinct variable name appearing in this pattern.
    pub fn variables(&self) -> Vec<&str> {
        [&self.subject, &self.predicate, &self.object]
            .iter()
            .filter_map(|t| match t {
                Term::Var(name) => Some(name.as_str()),
                Term::Value(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A quad as stored: a triple, tagged with its partition model and
/// insertion/expiry/inference metadata (spec.md §3 "Triple (quad)").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quad {
    pub hash: u64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub expires: Option<DateTime<Utc>>,
    pub inferred: bool,
}

impl Quad {
    pub fn as_triple(&self) -> Triple {
        Triple::new(self.subject.clone(), self.predicate.clone(), self.object.clone())
    }
}
