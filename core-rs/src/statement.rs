//! Parses the wire protocol's flat statement strings (`"alfred rdf:type
//! Human"`, `"alfred rdfs:label \"Alfred Pennyworth\""`) into
//! [`Triple`]s and [`Pattern`]s, tolerating double-quoted literals that
//! contain whitespace (ported from minimalKB's `shlex`-based
//! `parse_stmt`).

use crate::errors::{KbError, Result};
use crate::store::{Pattern, Triple};
use crate::term::Term;
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)"|(\S+)"#).unwrap());

/// Splits a statement into its whitespace-separated tokens, treating a
/// double-quoted run as a single token even if it contains spaces.
pub fn tokenize(stmt: &str) -> Vec<String> {
    TOKEN
        .captures_iter(stmt)
        .map(|c| {
            if let Some(quoted) = c.get(1) {
                quoted.as_str().to_string()
            } else {
                c.get(2).unwrap().as_str().to_string()
            }
        })
        .collect()
}

/// Parses a statement string into a ground [`Triple`]. Exactly three
/// tokens are required — callers needing variables should use
/// [`parse_pattern`].
pub fn parse_statement(stmt: &str) -> Result<Triple> {
    let tokens = tokenize(stmt);
    match tokens.as_slice() {
        [s, p, o] => Ok(Triple::new(s.clone(), p.clone(), o.clone())),
        _ => Err(KbError::Parse(format!(
            "expected a 3-token statement, got {} token(s): '{}'",
            tokens.len(),
            stmt
        ))),
    }
}

/// Parses a statement string into a [`Pattern`], where any token prefixed
/// with `?` becomes a variable.
pub fn parse_pattern(stmt: &str) -> Result<Pattern> {
    let tokens = tokenize(stmt);
    match tokens.as_slice() {
        [s, p, o] => Ok(Pattern::new(Term::from(s.as_str()), Term::from(p.as_str()), Term::from(o.as_str()))),
        _ => Err(KbError::Parse(format!(
            "expected a 3-token pattern, got {} token(s): '{}'",
            tokens.len(),
            stmt
        ))),
    }
}
