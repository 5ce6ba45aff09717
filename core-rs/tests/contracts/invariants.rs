//! Universal invariants (spec.md §8, T1-T8), tested against the public
//! `minimalkb_core` API rather than internals.

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
fn t1_added_triple_is_findable() {
    let mut store = TripleStore::new();
    store.add(&[Triple::new("alfred", "likes", "icecream")], DEFAULT_MODEL, 0, false);
    let m = models(&[DEFAULT_MODEL]);
    let result = query::find(&store, &["x".to_string()], &[pat("?x", "likes", "icecream")], &m).unwrap();
    assert_eq!(result.into_values(), vec!["alfred".to_string()]);
}

#[test]
fn t2_add_is_idempotent() {
    let mut store = TripleStore::new();
    let t = Triple::new("alfred", "likes", "icecream");
    store.add(&[t.clone()], DEFAULT_MODEL, 0, false);
    store.add(&[t.clone()], DEFAULT_MODEL, 0, false);
    store.add(&[t], DEFAULT_MODEL, 0, false);
    let m = models(&[DEFAULT_MODEL]);
    assert_eq!(store.about("alfred", &m).len(), 1);
}

#[test]
fn t3_retract_then_exist_is_false() {
    let mut store = TripleStore::new();
    let t = Triple::new("alfred", "likes", "icecream");
    store.add(&[t.clone()], DEFAULT_MODEL, 0, false);
    store.delete(&[t], DEFAULT_MODEL);
    let m = models(&[DEFAULT_MODEL]);
    assert!(!store.has(&[pat("alfred", "likes", "icecream")], &m).unwrap());
}

#[test]
fn t4_expiry_removes_only_the_expired_triple() {
    let mut store = TripleStore::new();
    store.add(&[Triple::new("alfred", "likes", "icecream")], DEFAULT_MODEL, 0, false);
    store.add(&[Triple::new("nono", "isIn", "garage")], DEFAULT_MODEL, 1, false);

    let later = chrono::Utc::now() + chrono::Duration::seconds(2);
    let expired = store.expired_hashes(later);
    store.delete_by_hash(&expired);

    let m = models(&[DEFAULT_MODEL]);
    assert!(!store.has(&[pat("nono", "isIn", "garage")], &m).unwrap());
    assert!(store.has(&[pat("alfred", "likes", "icecream")], &m).unwrap());
}

#[test]
fn t5_functional_property_update_keeps_only_latest_value() {
    let mut store = TripleStore::new();
    store.add(&[Triple::new("isNice", "rdf:type", "owl:FunctionalProperty")], DEFAULT_MODEL, 0, false);
    store.update(&[Triple::new("nono", "isNice", "o1")], DEFAULT_MODEL, 0);
    store.update(&[Triple::new("nono", "isNice", "o2")], DEFAULT_MODEL, 0);

    let m = models(&[DEFAULT_MODEL]);
    let rows = store.about("nono", &m);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].object, "o2");
}

#[test]
fn t6_direct_vs_full_classification() {
    let mut store = TripleStore::new();
    store.add(
        &[
            Triple::new("Human", "rdfs:subClassOf", "Animal"),
            Triple::new("john", "rdf:type", "Human"),
        ],
        DEFAULT_MODEL,
        0,
        false,
    );
    reasoner::classify(&mut store);

    let m = models(&[DEFAULT_MODEL]);
    assert!(store.has(&[pat("john", "rdf:type", "Animal")], &m).unwrap());

    let mut full = store.classes_of("john", false, &m);
    full.sort();
    assert_eq!(full, vec!["Animal".to_string(), "Human".to_string()]);

    let direct = store.classes_of("john", true, &m);
    assert_eq!(direct, vec!["Human".to_string()]);
}

#[test]
fn t7_retracting_asserted_triple_purges_inferred_rows_then_rederives() {
    let mut store = TripleStore::new();
    store.add(
        &[
            Triple::new("Human", "rdfs:subClassOf", "Animal"),
            Triple::new("john", "rdf:type", "Human"),
            Triple::new("jane", "rdf:type", "Human"),
        ],
        DEFAULT_MODEL,
        0,
        false,
    );
    reasoner::classify(&mut store);

    let m = models(&[DEFAULT_MODEL]);
    assert!(store.has(&[pat("john", "rdf:type", "Animal")], &m).unwrap());
    assert!(store.has(&[pat("jane", "rdf:type", "Animal")], &m).unwrap());

    store.delete(&[Triple::new("john", "rdf:type", "Human")], DEFAULT_MODEL);
    // Retraction purges every inferred row store-wide.
    assert!(!store.has(&[pat("jane", "rdf:type", "Animal")], &m).unwrap());

    // The reasoner re-derives what's still supported on its next tick.
    reasoner::classify(&mut store);
    assert!(!store.has(&[pat("john", "rdf:type", "Animal")], &m).unwrap());
    assert!(store.has(&[pat("jane", "rdf:type", "Animal")], &m).unwrap());
}

#[test]
fn t8_subscription_ids_are_deterministic() {
    let store = TripleStore::new();
    let mut registry = EventRegistry::new();
    let m = models(&[DEFAULT_MODEL]);

    let id1 = registry
        .subscribe(&store, EventKind::NewInstance, Trigger::Persistent, "o", vec![pat("?o", "isIn", "room")], m.clone(), "client1")
        .unwrap();
    let id2 = registry
        .subscribe(&store, EventKind::NewInstance, Trigger::Persistent, "o", vec![pat("?o", "isIn", "room")], m, "client2")
        .unwrap();

    assert_eq!(id1, id2);
}
