//! The triple store: a persistent table of quads, partitioned by model,
//! with insertion/expiry/inference metadata (spec.md §4.1).

mod memo;
mod quad;

pub use quad::{Pattern, Quad, Triple};

use crate::errors::{KbError, Result};
use crate::hash::quad_hash;
use crate::term::Term;
use chrono::{Duration, Utc};
use memo::Memo;
use std::collections::{HashMap, HashSet};
use std::fmt;

pub const DEFAULT_MODEL: &str = "default";

const RDF_TYPE: &str = "rdf:type";
const SUBCLASS_OF: &str = "rdfs:subClassOf";
const LABEL_PREDICATE: &str = "rdfs:label";
const FUNCTIONAL_PROPERTY: &str = "owl:FunctionalProperty";
const OBJECT_PROPERTY: &str = "owl:ObjectProperty";
const DATATYPE_PROPERTY: &str = "owl:DatatypeProperty";
const CLASS: &str = "owl:Class";

/// The classification returned by [`TripleStore::type_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptType {
    Class,
    Instance,
    ObjectProperty,
    DatatypeProperty,
    Property,
    Undefined,
}

impl fmt::Display for ConceptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConceptType::Class => "class",
            ConceptType::Instance => "instance",
            ConceptType::ObjectProperty => "object_property",
            ConceptType::DatatypeProperty => "datatype_property",
            ConceptType::Property => "property",
            ConceptType::Undefined => "undefined",
        };
        write!(f, "{}", s)
    }
}

/// Persistent table of quadruples with model partitioning, inference flags,
/// expiry and functional-property replacement semantics (spec.md §4.1).
pub struct TripleStore {
    quads: HashMap<u64, Quad>,
    generation: u64,
    functional_properties: HashSet<String>,
    label_memo: Memo<(String, Vec<String>), String>,
    type_memo: Memo<(String, Vec<String>), ConceptType>,
}

impl Default for TripleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TripleStore {
    pub fn new() -> Self {
        Self {
            quads: HashMap::new(),
            generation: 0,
            functional_properties: HashSet::new(),
            label_memo: Memo::new(),
            type_memo: Memo::new(),
        }
    }

    /// Drops every quad (spec.md §4.6 `clear`).
    pub fn clear(&mut self) {
        self.quads.clear();
        self.on_update();
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Inserts each triple under `model`, stamping `timestamp = now`. If
    /// `lifespan > 0`, sets `expires = now + lifespan`. If `replace` is
    /// true, every existing row matching `(s, p, *, model)` is deleted
    /// first for each input triple, before the inserts happen (used by
    /// functional-property `update`). Duplicate inserts (by hash) are
    /// silently skipped.
    pub fn add(&mut self, triples: &[Triple], model: &str, lifespan: u64, replace: bool) {
        let now = Utc::now();
        let expires = if lifespan > 0 {
            Some(now + Duration::seconds(lifespan as i64))
        } else {
            None
        };

        if replace {
            for t in triples {
                self.quads.retain(|_, q| {
                    !(q.model == model && q.subject == t.subject && q.predicate == t.predicate)
                });
            }
        }

        for t in triples {
            let h = quad_hash(&t.subject, &t.predicate, &t.object, model);
            self.quads.entry(h).or_insert(Quad {
                hash: h,
                subject: t.subject.clone(),
                predicate: t.predicate.clone(),
                object: t.object.clone(),
                model: model.to_string(),
                timestamp: now,
                expires,
                inferred: false,
            });
        }

        self.on_update();
    }

    /// Insert-or-ignore for reasoner-derived rows; always `inferred = true`
    /// and never displaces an asserted row with the same key (spec.md I5).
    pub fn add_inferred(&mut self, quads: &[(Triple, String)]) -> usize {
        let now = Utc::now();
        let mut inserted = 0;
        for (t, model) in quads {
            let h = quad_hash(&t.subject, &t.predicate, &t.object, model);
            if let std::collections::hash_map::Entry::Vacant(e) = self.quads.entry(h) {
                e.insert(Quad {
                    hash: h,
                    subject: t.subject.clone(),
                    predicate: t.predicate.clone(),
                    object: t.object.clone(),
                    model: model.clone(),
                    timestamp: now,
                    expires: None,
                    inferred: true,
                });
                inserted += 1;
            }
        }
        if inserted > 0 {
            self.on_update();
        }
        inserted
    }

    /// Deletes every row where `inferred = true` across all models (the
    /// reasoner will re-derive anything still valid on its next tick), then
    /// deletes the rows matching each `(s, p, o, model)` by hash (spec.md
    /// I2).
    pub fn delete(&mut self, triples: &[Triple], model: &str) {
        self.quads.retain(|_, q| !q.inferred);

        for t in triples {
            let h = quad_hash(&t.subject, &t.predicate, &t.object, model);
            self.quads.remove(&h);
        }

        self.on_update();
    }

    /// Deletes quads whose hash is in `hashes`, without the inferred-row
    /// purge (used by the lifespan sweeper, which is pruning expired rows,
    /// not retracting asserted ones).
    pub fn delete_by_hash(&mut self, hashes: &[u64]) -> usize {
        let mut removed = 0;
        for h in hashes {
            if self.quads.remove(h).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            self.on_update();
        }
        removed
    }

    /// Hashes of every quad whose `expires` is before `now`.
    pub fn expired_hashes(&self, now: chrono::DateTime<Utc>) -> Vec<u64> {
        self.quads
            .values()
            .filter(|q| q.expires.map(|e| e < now).unwrap_or(false))
            .map(|q| q.hash)
            .collect()
    }

    /// Partitions inputs by whether the predicate is currently a functional
    /// property; functional ones go through `add(..., replace=true)`, the
    /// rest through plain `add` (spec.md I4).
    pub fn update(&mut self, triples: &[Triple], model: &str, lifespan: u64) {
        let mut to_add = Vec::new();
        let mut to_replace = Vec::new();
        for t in triples {
            if self.functional_properties.contains(&t.predicate) {
                to_replace.push(t.clone());
            } else {
                to_add.push(t.clone());
            }
        }
        if !to_add.is_empty() {
            self.add(&to_add, model, lifespan, false);
        }
        if !to_replace.is_empty() {
            self.add(&to_replace, model, lifespan, true);
        }
    }

    /// Every quad in `models` where `resource` occurs in any position,
    /// projected to `(s, p, o)`.
    pub fn about(&self, resource: &str, models: &HashSet<String>) -> Vec<Triple> {
        self.quads
            .values()
            .filter(|q| models.contains(&q.model))
            .filter(|q| q.subject == resource || q.predicate == resource || q.object == resource)
            .map(|q| q.as_triple())
            .collect()
    }

    /// True iff every pattern has at least one match under `models`,
    /// intersecting candidate sets across patterns. Rejects any pattern
    /// with >=2 variables with `Unsupported` (spec.md §4.1).
    pub fn has(&self, patterns: &[Pattern], models: &HashSet<String>) -> Result<bool> {
        let mut candidates: Option<HashSet<u64>> = None;
        for p in patterns {
            if p.num_variables() >= 2 {
                return Err(KbError::Unsupported(
                    "has() only supports patterns with 0 or 1 variables".to_string(),
                ));
            }
            let matches = self.matching_hashes(p, Some(models), false);
            candidates = Some(match candidates {
                None => matches,
                Some(prev) => &prev & &matches,
            });
            if candidates.as_ref().map(|c| c.is_empty()).unwrap_or(false) {
                return Ok(false);
            }
        }
        Ok(candidates.map(|c| !c.is_empty()).unwrap_or(false))
    }

    /// Shorthand `rdf:type` lookup.
    pub fn classes_of(&self, concept: &str, direct: bool, models: &HashSet<String>) -> Vec<String> {
        self.simple_object_query(concept, RDF_TYPE, models, direct)
    }

    /// Shorthand `rdf:type` reverse lookup.
    pub fn instances_of(&self, concept: &str, direct: bool, models: &HashSet<String>) -> Vec<String> {
        self.simple_subject_query(RDF_TYPE, concept, models, direct)
    }

    /// Shorthand `rdfs:subClassOf` lookup.
    pub fn superclasses_of(&self, concept: &str, direct: bool, models: &HashSet<String>) -> Vec<String> {
        self.simple_object_query(concept, SUBCLASS_OF, models, direct)
    }

    /// Shorthand `rdfs:subClassOf` reverse lookup.
    pub fn subclasses_of(&self, concept: &str, direct: bool, models: &HashSet<String>) -> Vec<String> {
        self.simple_subject_query(SUBCLASS_OF, concept, models, direct)
    }

    /// Any `rdfs:label` value for `concept`; falls back to `concept`
    /// itself. Memoized until the next mutation.
    pub fn label(&mut self, concept: &str, models: &HashSet<String>) -> String {
        let key = memo_key(concept, models);
        if let Some(cached) = self.label_memo.get(&key, self.generation) {
            return cached;
        }
        let labels = self.simple_object_query(concept, LABEL_PREDICATE, models, false);
        let result = labels.into_iter().next().unwrap_or_else(|| concept.to_string());
        self.label_memo.insert(key, self.generation, result.clone());
        result
    }

    /// Classifies `concept` as `class | instance | object_property |
    /// datatype_property | property | undefined` (spec.md §4.1). Memoized.
    pub fn type_of(&mut self, concept: &str, models: &HashSet<String>) -> ConceptType {
        let key = memo_key(concept, models);
        if let Some(cached) = self.type_memo.get(&key, self.generation) {
            return cached;
        }
        let result = self.compute_type_of(concept, models);
        self.type_memo.insert(key, self.generation, result);
        result
    }

    fn compute_type_of(&self, concept: &str, models: &HashSet<String>) -> ConceptType {
        let classes = self.classes_of(concept, false, models);
        if !classes.is_empty() {
            if classes.iter().any(|c| c == OBJECT_PROPERTY) {
                return ConceptType::ObjectProperty;
            }
            if classes.iter().any(|c| c == DATATYPE_PROPERTY) {
                return ConceptType::DatatypeProperty;
            }
            if classes.iter().any(|c| c == CLASS) {
                return ConceptType::Class;
            }
            return ConceptType::Instance;
        }

        if !self.instances_of(concept, false, models).is_empty()
            || !self.subclasses_of(concept, false, models).is_empty()
            || !self.superclasses_of(concept, false, models).is_empty()
        {
            return ConceptType::Class;
        }

        let appears_as_predicate = Pattern::new(Term::var("s"), Term::value(concept), Term::var("o"));
        if !self.matching_hashes(&appears_as_predicate, Some(models), false).is_empty() {
            return ConceptType::Property;
        }

        ConceptType::Undefined
    }

    /// Recomputes the functional-property cache and invalidates the
    /// `label`/`type_of` memoization by bumping the generation counter
    /// (spec.md §4.1 "on_update hook", §9 "Memoization").
    fn on_update(&mut self) {
        self.generation += 1;
        // Functional properties are tracked across the whole store,
        // regardless of model partition — mirroring minimalKB's
        // `onupdate`, which recomputes them with an unrestricted query.
        self.functional_properties = self
            .quads
            .values()
            .filter(|q| q.predicate == RDF_TYPE && q.object == FUNCTIONAL_PROPERTY)
            .map(|q| q.subject.clone())
            .collect();
    }

    pub fn functional_properties(&self) -> &HashSet<String> {
        &self.functional_properties
    }

    /// All quads, used by the reasoner to take a snapshot without holding
    /// the store lock for the whole classification tick.
    pub fn snapshot(&self) -> Vec<Quad> {
        self.quads.values().cloned().collect()
    }

    fn simple_object_query(&self, subject: &str, predicate: &str, models: &HashSet<String>, direct: bool) -> Vec<String> {
        self.quads
            .values()
            .filter(|q| models.contains(&q.model))
            .filter(|q| q.subject == subject && q.predicate == predicate)
            .filter(|q| !direct || !q.inferred)
            .map(|q| q.object.clone())
            .collect()
    }

    fn simple_subject_query(&self, predicate: &str, object: &str, models: &HashSet<String>, direct: bool) -> Vec<String> {
        self.quads
            .values()
            .filter(|q| models.contains(&q.model))
            .filter(|q| q.predicate == predicate && q.object == object)
            .filter(|q| !direct || !q.inferred)
            .map(|q| q.subject.clone())
            .collect()
    }

    /// Hashes of quads matching a pattern; used by the query engine and by
    /// `has`. `models = None` means "no restriction" (used internally,
    /// mirroring minimalKB's empty-model-list convention).
    pub(crate) fn matching_hashes(&self, pattern: &Pattern, models: Option<&HashSet<String>>, asserted_only: bool) -> HashSet<u64> {
        self.quads
            .values()
            .filter(|q| models.map(|m| m.contains(&q.model)).unwrap_or(true))
            .filter(|q| !asserted_only || !q.inferred)
            .filter(|q| matches_term(&pattern.subject, &q.subject))
            .filter(|q| matches_term(&pattern.predicate, &q.predicate))
            .filter(|q| matches_term(&pattern.object, &q.object))
            .map(|q| q.hash)
            .collect()
    }

    pub(crate) fn get(&self, hash: u64) -> Option<&Quad> {
        self.quads.get(&hash)
    }

    /// Selects the one unbound column (the argument left as `None`) among
    /// quads whose other two positions fall in the given allowed-value
    /// sets (spec.md §4.2 dependent-pattern resolution; ported from
    /// minimalKB's `selectfromset`). Exactly one of `subject`/`predicate`
    /// /`object` must be `None`.
    pub(crate) fn select_column(
        &self,
        subject: Option<&HashSet<String>>,
        predicate: Option<&HashSet<String>>,
        object: Option<&HashSet<String>>,
        models: &HashSet<String>,
    ) -> HashSet<String> {
        self.quads
            .values()
            .filter(|q| models.contains(&q.model))
            .filter(|q| subject.map(|s| s.contains(&q.subject)).unwrap_or(true))
            .filter(|q| predicate.map(|s| s.contains(&q.predicate)).unwrap_or(true))
            .filter(|q| object.map(|s| s.contains(&q.object)).unwrap_or(true))
            .map(|q| {
                if subject.is_none() {
                    q.subject.clone()
                } else if predicate.is_none() {
                    q.predicate.clone()
                } else {
                    q.object.clone()
                }
            })
            .collect()
    }

    /// Quads matching a pattern, as ground triples (used by
    /// `query::single_pattern` and similar).
    pub(crate) fn matching_triples(&self, pattern: &Pattern, models: Option<&HashSet<String>>, asserted_only: bool) -> Vec<Triple> {
        self.matching_hashes(pattern, models, asserted_only)
            .into_iter()
            .filter_map(|h| self.get(h))
            .map(|q| q.as_triple())
            .collect()
    }
}

fn matches_term(term: &Term, value: &str) -> bool {
    match term {
        Term::Var(_) => true,
        Term::Value(v) => v == value,
    }
}

fn memo_key(concept: &str, models: &HashSet<String>) -> (String, Vec<String>) {
    let mut m: Vec<String> = models.iter().cloned().collect();
    m.sort();
    (concept.to_string(), m)
}
