//! End-to-end scenarios exercising the store, query engine, reasoner and
//! event subsystem together, the way a client session would.
//!
//! **Direct API Testing** — drives `TripleStore`/`EventRegistry`/
//! `reasoner::classify` directly instead of a running daemon, for fast,
//! deterministic runs with no thread scheduling involved.

use minimalkb_core::events::{EventKind, EventRegistry, Trigger};
use minimalkb_core::query;
use minimalkb_core::reasoner;
use minimalkb_core::term::Term;
use minimalkb_core::{Pattern, Triple, TripleStore, DEFAULT_MODEL};
use std::collections::HashSet;

fn models(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn pat(s: &str, p: &str, o: &str) -> Pattern {
    Pattern::new(Term::from(s), Term::from(p), Term::from(o))
}

#[test]
fn test_scenario_basic_modification_and_retrieval() {
    let mut store = TripleStore::new();
    store.add(
        &[
            Triple::new("johnny", "rdf:type", "Human"),
            Triple::new("alfred", "rdf:type", "Human"),
            Triple::new("alfred", "likes", "icecream"),
        ],
        DEFAULT_MODEL,
        0,
        false,
    );

    let m = models(&[DEFAULT_MODEL]);
    assert_eq!(store.about("Human", &m).len(), 2);

    let result = query::find(&store, &["x".to_string()], &[pat("?x", "rdf:type", "Human")], &m).unwrap();
    let mut values = result.into_values();
    values.sort();
    assert_eq!(values, vec!["alfred".to_string(), "johnny".to_string()]);

    store.delete(&[Triple::new("alfred", "rdf:type", "Human")], DEFAULT_MODEL);
    let result = query::find(&store, &["x".to_string()], &[pat("?x", "rdf:type", "Human")], &m).unwrap();
    assert_eq!(result.into_values(), vec!["johnny".to_string()]);
}

#[test]
fn test_scenario_existence_with_wildcards() {
    let mut store = TripleStore::new();
    store.add(
        &[
            Triple::new("johnny", "rdf:type", "Human"),
            Triple::new("alfred", "rdf:type", "Human"),
            Triple::new("alfred", "likes", "icecream"),
        ],
        DEFAULT_MODEL,
        0,
        false,
    );
    let m = models(&[DEFAULT_MODEL]);

    assert!(store.has(&[pat("alfred", "likes", "?t")], &m).unwrap());
    assert!(!store.has(&[pat("alfred", "dislikes", "?t")], &m).unwrap());
    assert!(!store.has(&[pat("alfred", "likes", "mygrandmother")], &m).unwrap());
}

#[test]
fn test_scenario_rdfs_inference_across_ticks() {
    let mut store = TripleStore::new();
    store.add(
        &[
            Triple::new("alfred", "rdf:type", "Human"),
            Triple::new("Human", "rdfs:subClassOf", "Animal"),
        ],
        DEFAULT_MODEL,
        0,
        false,
    );
    reasoner::classify(&mut store);

    let m = models(&[DEFAULT_MODEL]);
    assert!(store.has(&[pat("alfred", "rdf:type", "Animal")], &m).unwrap());

    store.add(&[Triple::new("Animal", "rdfs:subClassOf", "Thing")], DEFAULT_MODEL, 0, false);
    reasoner::classify(&mut store);
    assert!(store.has(&[pat("alfred", "rdf:type", "Thing")], &m).unwrap());
}

#[test]
fn test_scenario_functional_property_update() {
    let mut store = TripleStore::new();
    store.add(&[Triple::new("isNice", "rdf:type", "owl:FunctionalProperty")], DEFAULT_MODEL, 0, false);
    store.update(&[Triple::new("nono", "isNice", "true")], DEFAULT_MODEL, 0);
    store.update(&[Triple::new("nono", "isNice", "false")], DEFAULT_MODEL, 0);

    let m = models(&[DEFAULT_MODEL]);
    let true_result = query::find(&store, &["x".to_string()], &[pat("?x", "isNice", "true")], &m).unwrap();
    assert!(true_result.is_empty());

    let false_result = query::find(&store, &["x".to_string()], &[pat("?x", "isNice", "false")], &m).unwrap();
    assert_eq!(false_result.into_values(), vec!["nono".to_string()]);
}

#[test]
fn test_scenario_event_firing() {
    let mut store = TripleStore::new();
    let mut registry = EventRegistry::new();
    let m = models(&[DEFAULT_MODEL]);

    let id = registry
        .subscribe(&store, EventKind::NewInstance, Trigger::Persistent, "o", vec![pat("?o", "isIn", "room")], m.clone(), "client1")
        .unwrap();

    store.add(&[Triple::new("alfred", "isIn", "garage")], DEFAULT_MODEL, 0, false);
    assert!(registry.evaluate(&store).is_empty());

    store.add(&[Triple::new("alfred", "isIn", "room")], DEFAULT_MODEL, 0, false);
    let fired = registry.evaluate(&store);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].event_id, id);
    assert_eq!(fired[0].content, vec!["alfred".to_string()]);

    store.delete(&[Triple::new("alfred", "isIn", "room")], DEFAULT_MODEL);
    assert!(registry.evaluate(&store).is_empty());

    store.add(&[Triple::new("alfred", "leaves", "room")], DEFAULT_MODEL, 0, false);
    assert!(registry.evaluate(&store).is_empty(), "an unrelated triple must not fire the `isIn` subscription");

    store.add(&[Triple::new("batman", "isIn", "room")], DEFAULT_MODEL, 0, false);
    let fired = registry.evaluate(&store);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].content, vec!["batman".to_string()]);
}

#[test]
fn test_scenario_multi_pattern_join_with_inference() {
    let mut store = TripleStore::new();
    let mut registry = EventRegistry::new();
    let m = models(&[DEFAULT_MODEL]);

    registry
        .subscribe(
            &store,
            EventKind::NewInstance,
            Trigger::Persistent,
            "a",
            vec![pat("?a", "desires", "?act"), pat("?act", "rdf:type", "Action")],
            m.clone(),
            "client1",
        )
        .unwrap();

    store.add(&[Triple::new("alfred", "desires", "ragnagna")], DEFAULT_MODEL, 0, false);
    assert!(registry.evaluate(&store).is_empty());

    store.add(&[Triple::new("ragnagna", "rdf:type", "Zorro")], DEFAULT_MODEL, 0, false);
    assert!(registry.evaluate(&store).is_empty());

    store.add(&[Triple::new("Zorro", "rdfs:subClassOf", "Action")], DEFAULT_MODEL, 0, false);
    reasoner::classify(&mut store);
    let fired = registry.evaluate(&store);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].content, vec!["alfred".to_string()]);
}
