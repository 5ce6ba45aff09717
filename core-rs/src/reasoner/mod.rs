//! The RDFS reasoner: a background worker that periodically snapshots the
//! store, derives the transitive closure of `rdf:type` / `rdfs:subClassOf`
//! (propagated through `owl:equivalentClass`) plus the symmetric closure of
//! a handful of OWL predicates, and merges anything new back in as inferred
//! rows (spec.md §4.4).

use crate::store::{Quad, Triple, TripleStore};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default classification rate, matching the system this is ported from.
pub const REASONER_HZ: u64 = 5;

const RDF_TYPE: &str = "rdf:type";
const SUBCLASS_OF: &str = "rdfs:subClassOf";
const EQUIVALENT_CLASS: &str = "owl:equivalentClass";
const SYMMETRIC_PREDICATES: [&str; 3] = ["owl:differentFrom", "owl:sameAs", "owl:disjointWith"];

#[derive(Default)]
struct OntoClass {
    parents: HashSet<String>,
    instances: HashSet<String>,
    equivalents: HashSet<String>,
}

/// Derives every `rdf:type` / `rdfs:subClassOf` row implied by the taxonomy
/// in `model` but not yet present, plus the symmetric closure of the
/// symmetric predicates, from a flat snapshot of quads. Pure and
/// side-effect free so it can be unit-tested without a running store.
pub fn classify_model(quads: &[Quad], model: &str) -> Vec<(Triple, String)> {
    let mut onto: HashMap<String, OntoClass> = HashMap::new();
    let mut rdftype: HashSet<(String, String)> = HashSet::new();
    let mut subclassof: HashSet<(String, String)> = HashSet::new();

    for q in quads.iter().filter(|q| q.model == model) {
        if q.predicate == RDF_TYPE {
            rdftype.insert((q.subject.clone(), q.object.clone()));
            onto.entry(q.object.clone()).or_default().instances.insert(q.subject.clone());
        } else if q.predicate == SUBCLASS_OF {
            subclassof.insert((q.subject.clone(), q.object.clone()));
            onto.entry(q.subject.clone()).or_default().parents.insert(q.object.clone());
        } else if q.predicate == EQUIVALENT_CLASS {
            onto.entry(q.subject.clone()).or_default().equivalents.insert(q.object.clone());
            onto.entry(q.object.clone()).or_default().equivalents.insert(q.subject.clone());
        }
    }

    let mut new_rdftype: HashSet<(String, String)> = HashSet::new();
    let mut new_subclassof: HashSet<(String, String)> = HashSet::new();

    fn add_instance(
        instance: &str,
        cls: &str,
        onto: &HashMap<String, OntoClass>,
        out: &mut HashSet<(String, String)>,
        seen: &mut HashSet<String>,
    ) {
        if !seen.insert(cls.to_string()) {
            return;
        }
        out.insert((instance.to_string(), cls.to_string()));
        if let Some(c) = onto.get(cls) {
            for parent in &c.parents {
                add_instance(instance, parent, onto, out, seen);
            }
        }
    }

    fn add_subclassof(
        scls: &str,
        cls: &str,
        onto: &HashMap<String, OntoClass>,
        out: &mut HashSet<(String, String)>,
        seen: &mut HashSet<String>,
    ) {
        if !seen.insert(cls.to_string()) {
            return;
        }
        out.insert((scls.to_string(), cls.to_string()));
        if let Some(c) = onto.get(cls) {
            for parent in &c.parents {
                add_subclassof(scls, parent, onto, out, seen);
            }
        }
    }

    let names: Vec<String> = onto.keys().cloned().collect();
    for name in &names {
        let cls = &onto[name];
        for instance in cls.instances.clone() {
            let mut seen = HashSet::new();
            add_instance(&instance, name, &onto, &mut new_rdftype, &mut seen);
        }
        for parent in cls.parents.clone() {
            let mut seen = HashSet::new();
            add_subclassof(name, &parent, &onto, &mut new_subclassof, &mut seen);
        }
        for equivalent in cls.equivalents.clone() {
            for instance in cls.instances.clone() {
                let mut seen = HashSet::new();
                add_instance(&instance, &equivalent, &onto, &mut new_rdftype, &mut seen);
            }
            for parent in cls.parents.clone() {
                let mut seen = HashSet::new();
                add_subclassof(&equivalent, &parent, &onto, &mut new_subclassof, &mut seen);
            }
        }
    }

    new_rdftype.retain(|pair| !rdftype.contains(pair));
    new_subclassof.retain(|pair| !subclassof.contains(pair));

    let mut out: Vec<(Triple, String)> = Vec::new();
    out.extend(new_rdftype.into_iter().map(|(i, c)| (Triple::new(i, RDF_TYPE, c), model.to_string())));
    out.extend(new_subclassof.into_iter().map(|(cc, cp)| (Triple::new(cc, SUBCLASS_OF, cp), model.to_string())));
    out.extend(symmetric_statements(quads, model));
    out
}

/// The reverse of every symmetric-predicate row not already present.
fn symmetric_statements(quads: &[Quad], model: &str) -> Vec<(Triple, String)> {
    let present: HashSet<(String, String, String)> = quads
        .iter()
        .filter(|q| q.model == model && SYMMETRIC_PREDICATES.contains(&q.predicate.as_str()))
        .map(|q| (q.subject.clone(), q.predicate.clone(), q.object.clone()))
        .collect();

    present
        .iter()
        .filter(|(s, p, o)| !present.contains(&(o.clone(), p.clone(), s.clone())))
        .map(|(s, p, o)| (Triple::new(o.clone(), p.clone(), s.clone()), model.to_string()))
        .collect()
}

/// One classification pass over every model currently present in the
/// store; returns how many inferred rows were newly merged in.
pub fn classify(store: &mut TripleStore) -> usize {
    let snapshot = store.snapshot();
    let models: HashSet<&str> = snapshot.iter().map(|q| q.model.as_str()).collect();

    let mut derived = Vec::new();
    for model in models {
        derived.extend(classify_model(&snapshot, model));
    }

    store.add_inferred(&derived)
}

/// Runs the reasoner on its own thread at [`REASONER_HZ`] until `running`
/// is cleared. `on_classified` is invoked (while the store lock is *not*
/// held) after any tick that merged new rows, so the event subsystem can
/// re-evaluate subscriptions against reasoner-driven changes.
pub fn spawn(
    store: Arc<Mutex<TripleStore>>,
    running: Arc<AtomicBool>,
    rate_hz: u64,
    on_classified: Arc<dyn Fn() + Send + Sync>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let period = Duration::from_millis(1000 / rate_hz);
        tracing::info!(rate_hz, "RDFS reasoner started");
        while running.load(Ordering::SeqCst) {
            std::thread::sleep(period);
            let merged = {
                let mut guard = store.lock().unwrap();
                classify(&mut guard)
            };
            if merged > 0 {
                tracing::debug!(merged, "reasoner merged new inferred rows");
                on_classified();
            }
        }
        tracing::info!("RDFS reasoner stopped");
    })
}
