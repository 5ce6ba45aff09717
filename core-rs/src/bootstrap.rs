//! Loads a bundled or user-supplied ontology file into the `"default"`
//! model at startup (ported from minimalKB's `load`, which the original
//! passes unparsed file lines straight to the store — a latent bug we do
//! not reproduce here; each non-empty, non-comment line is parsed as a
//! statement first).

use crate::errors::Result;
use crate::statement::parse_statement;
use crate::store::Triple;
use std::path::Path;

/// Parses every statement line in `path`, skipping blank lines and `#`
/// comments. Returns the ground triples ready to hand to
/// [`crate::store::TripleStore::add`].
pub fn load_file(path: &Path) -> Result<Vec<Triple>> {
    let contents = std::fs::read_to_string(path)?;
    load_str(&contents)
}

/// Same as [`load_file`] but from an in-memory string (used for the
/// bundled default ontology and in tests).
pub fn load_str(contents: &str) -> Result<Vec<Triple>> {
    contents
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(parse_statement)
        .collect()
}

/// The small bundled ontology shipped with the core (robotics-flavored
/// classes used by the test scenarios and the demo binary).
pub const BUNDLED_ONTOLOGY: &str = include_str!("../../ontologies/core.kb");
