//! The pattern-matching query engine: resolves patterns with variables
//! against the store, intersecting candidate sets and filtering dependent
//! patterns (spec.md §4.2).

use crate::errors::{KbError, Result};
use crate::store::{Pattern, TripleStore};
use crate::term::Term;
use std::collections::{HashMap, HashSet};

/// The result of [`find`]. A query asking for one variable returns a flat
/// value set; asking for several returns rows aligned to the requested
/// variable order — except the single-pattern, multi-variable fast path,
/// which (like the system this is ported from) always projects the full
/// `(s, p, o)` triple regardless of the requested variable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Values(Vec<String>),
    Rows(Vec<Vec<String>>),
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        match self {
            QueryResult::Values(v) => v.is_empty(),
            QueryResult::Rows(r) => r.is_empty(),
        }
    }

    /// Convenience accessor for single-variable queries (used by the event
    /// subsystem, which only ever asks for one output variable).
    pub fn into_values(self) -> Vec<String> {
        match self {
            QueryResult::Values(v) => v,
            QueryResult::Rows(rows) => rows.into_iter().flatten().collect(),
        }
    }
}

/// Resolves `vars` over `patterns` under `models` (spec.md §4.2).
pub fn find(store: &TripleStore, vars: &[String], patterns: &[Pattern], models: &HashSet<String>) -> Result<QueryResult> {
    if vars.is_empty() || patterns.is_empty() {
        return Ok(empty_result(vars));
    }

    let all_vars: HashSet<String> = patterns.iter().flat_map(|p| p.variables()).map(|s| s.to_string()).collect();
    if !vars.iter().all(|v| all_vars.contains(v)) {
        return Ok(empty_result(vars));
    }

    if patterns.len() == 1 {
        return Ok(single_pattern(store, &patterns[0], models));
    }

    let independent: Vec<&Pattern> = patterns.iter().filter(|p| p.num_variables() == 1).collect();
    let dependent: Vec<&Pattern> = patterns.iter().filter(|p| p.num_variables() >= 2).collect();

    let mut candidates: HashMap<String, HashSet<String>> = HashMap::new();
    for v in &all_vars {
        for p in independent.iter().filter(|p| p.variables().contains(&v.as_str())) {
            let values = independent_values(store, p, models);
            candidates
                .entry(v.clone())
                .and_modify(|existing| *existing = existing.intersection(&values).cloned().collect())
                .or_insert(values);
        }
    }

    for v in &all_vars {
        if let Some(c) = candidates.get(v) {
            if c.is_empty() {
                return Ok(empty_result(vars));
            }
        }
    }

    if vars.len() == 1 {
        let var = &vars[0];

        if dependent.is_empty() {
            let values = candidates.get(var).cloned().unwrap_or_default();
            return Ok(QueryResult::Values(values.into_iter().collect()));
        }

        let mut result: Option<HashSet<String>> = None;
        for pattern in &dependent {
            let values = dependent_values(store, pattern, var, &candidates, models)?;
            result = Some(match result {
                None => values,
                Some(prev) => prev.intersection(&values).cloned().collect(),
            });
        }
        return Ok(QueryResult::Values(result.unwrap_or_default().into_iter().collect()));
    }

    // |V| > 1: multi-variable dependent joins are an acknowledged gap
    // (spec.md §4.2 step 4). We can still answer the cross product when
    // every requested variable is fully resolved by independent patterns.
    if !dependent.is_empty() {
        return Err(KbError::Unsupported(
            "multi-variable queries with dependent patterns are not supported".to_string(),
        ));
    }

    let mut rows = vec![Vec::new()];
    for v in vars {
        let values: Vec<String> = candidates.get(v).cloned().unwrap_or_default().into_iter().collect();
        let mut next_rows = Vec::new();
        for row in &rows {
            for value in &values {
                let mut next = row.clone();
                next.push(value.clone());
                next_rows.push(next);
            }
        }
        rows = next_rows;
    }
    Ok(QueryResult::Rows(rows))
}

fn empty_result(vars: &[String]) -> QueryResult {
    if vars.len() == 1 {
        QueryResult::Values(Vec::new())
    } else {
        QueryResult::Rows(Vec::new())
    }
}

/// Single-pattern fast path (spec.md §4.2): one variable returns the set of
/// values it can take; two or three return full matching quads projected to
/// `(s, p, o)`.
fn single_pattern(store: &TripleStore, pattern: &Pattern, models: &HashSet<String>) -> QueryResult {
    if pattern.num_variables() == 1 {
        QueryResult::Values(independent_values(store, pattern, models).into_iter().collect())
    } else {
        let rows = store
            .matching_triples(pattern, Some(models), false)
            .into_iter()
            .map(|t| vec![t.subject, t.predicate, t.object])
            .collect();
        QueryResult::Rows(rows)
    }
}

/// The set of values an independent pattern's (single) variable can take.
fn independent_values(store: &TripleStore, pattern: &Pattern, models: &HashSet<String>) -> HashSet<String> {
    let triples = store.matching_triples(pattern, Some(models), false);
    triples
        .into_iter()
        .map(|t| match &pattern.subject {
            Term::Var(_) => t.subject,
            Term::Value(_) => match &pattern.predicate {
                Term::Var(_) => t.predicate,
                Term::Value(_) => t.object,
            },
        })
        .collect()
}

/// Resolves a dependent pattern for the single requested variable `var`,
/// substituting every other token by its known candidate set (or the
/// literal singleton, if it's a ground value or an unconstrained variable).
fn dependent_values(
    store: &TripleStore,
    pattern: &Pattern,
    var: &str,
    candidates: &HashMap<String, HashSet<String>>,
    models: &HashSet<String>,
) -> Result<HashSet<String>> {
    let positions = [&pattern.subject, &pattern.predicate, &pattern.object];
    let unknown_count = positions.iter().filter(|t| matches!(t, Term::Var(name) if name == var)).count();
    if unknown_count != 1 {
        return Err(KbError::Server(format!(
            "dependent pattern must contain the requested variable ?{} exactly once",
            var
        )));
    }

    let prepare = |term: &Term| -> Option<HashSet<String>> {
        match term {
            Term::Var(name) if name == var => None,
            Term::Var(name) => Some(candidates.get(name).cloned().unwrap_or_else(|| {
                let mut single = HashSet::new();
                single.insert(format!("?{}", name));
                single
            })),
            Term::Value(v) => {
                let mut single = HashSet::new();
                single.insert(v.clone());
                Some(single)
            }
        }
    };

    let subject = prepare(&pattern.subject);
    let predicate = prepare(&pattern.predicate);
    let object = prepare(&pattern.object);

    Ok(store.select_column(subject.as_ref(), predicate.as_ref(), object.as_ref(), models))
}
