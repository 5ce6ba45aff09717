//! Exercises the public `KnowledgeBase` facade, including its real
//! reasoner and lifespan worker threads.

use minimalkb_core::config::KbConfig;
use minimalkb_core::events::{EventKind, Trigger};
use minimalkb_core::term::Term;
use minimalkb_core::{KnowledgeBase, Pattern, Triple};
use serde_json::json;
use std::time::Duration;

fn pat(s: &str, p: &str, o: &str) -> Pattern {
    Pattern::new(Term::from(s), Term::from(p), Term::from(o))
}

#[test]
fn test_facade_add_find_retract_roundtrip() {
    let kb = KnowledgeBase::new(KbConfig::default()).unwrap();
    assert!(kb.hello().contains("minimalkb-core"));

    kb.add(&[Triple::new("johnny", "rdf:type", "Human")], None, 0).unwrap();
    let result = kb.find(&["x".to_string()], &[pat("?x", "rdf:type", "Human")], None).unwrap();
    assert_eq!(result.into_values(), vec!["johnny".to_string()]);

    kb.retract(&[Triple::new("johnny", "rdf:type", "Human")], None).unwrap();
    assert!(!kb.exist(&[pat("johnny", "rdf:type", "Human")], None).unwrap());
}

#[test]
fn test_facade_reasoner_worker_classifies_in_background() {
    let kb = KnowledgeBase::new(KbConfig::default()).unwrap();
    kb.add(
        &[
            Triple::new("Human", "rdfs:subClassOf", "Animal"),
            Triple::new("alfred", "rdf:type", "Human"),
        ],
        None,
        0,
    )
    .unwrap();

    let mut seen = false;
    for _ in 0..20 {
        std::thread::sleep(Duration::from_millis(100));
        if kb.exist(&[pat("alfred", "rdf:type", "Animal")], None).unwrap() {
            seen = true;
            break;
        }
    }
    assert!(seen, "reasoner worker never classified alfred as an Animal");
}

#[test]
fn test_facade_subscribe_and_poll() {
    let kb = KnowledgeBase::new(KbConfig::default()).unwrap();
    let id = kb
        .subscribe(EventKind::NewInstance, Trigger::Persistent, "o", vec![pat("?o", "isIn", "room")], None, "client1")
        .unwrap();

    kb.add(&[Triple::new("alfred", "isIn", "room")], None, 0).unwrap();
    let notifications = kb.poll("client1");
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].event_id, id);
    assert_eq!(notifications[0].content, vec!["alfred".to_string()]);

    // Already drained.
    assert!(kb.poll("client1").is_empty());
}

#[test]
fn test_facade_details_and_method_info() {
    let kb = KnowledgeBase::new(KbConfig::default()).unwrap();
    kb.add(&[Triple::new("johnny", "rdf:type", "Human")], None, 0).unwrap();

    assert_eq!(kb.details("johnny", None), kb.about("johnny", None));
    assert!(kb.method_info("find").is_ok());
    assert!(kb.method_info("getDirectClassesOf").unwrap().compat);
    assert!(kb.method_info("doesNotExist").is_err());
}

#[test]
fn test_facade_honors_configured_worker_rates() {
    let config = KbConfig {
        reasoner_hz: 20,
        ..KbConfig::default()
    };
    let kb = KnowledgeBase::new(config).unwrap();
    kb.add(
        &[
            Triple::new("Human", "rdfs:subClassOf", "Animal"),
            Triple::new("alfred", "rdf:type", "Human"),
        ],
        None,
        0,
    )
    .unwrap();

    let mut seen = false;
    for _ in 0..20 {
        std::thread::sleep(Duration::from_millis(50));
        if kb.exist(&[pat("alfred", "rdf:type", "Animal")], None).unwrap() {
            seen = true;
            break;
        }
    }
    assert!(seen, "reasoner never classified at the configured rate");
}

#[test]
fn test_facade_compat_aliases() {
    let kb = KnowledgeBase::new(KbConfig::default()).unwrap();
    kb.add_for_agent("johnny", &[Triple::new("johnny", "rdf:type", "Human")]).unwrap();
    assert!(kb.exist(&[pat("johnny", "rdf:type", "Human")], Some(&["johnny".to_string()])).unwrap());

    let found = kb.find_for_agent("johnny", "x", &[pat("?x", "rdf:type", "Human")]).unwrap();
    assert_eq!(found.into_values(), vec!["johnny".to_string()]);

    assert!(kb.check());
    assert_eq!(kb.get_label("johnny"), "johnny");

    kb.remove_for_agent("johnny", &[Triple::new("johnny", "rdf:type", "Human")]).unwrap();
    assert!(!kb.exist(&[pat("johnny", "rdf:type", "Human")], Some(&["johnny".to_string()])).unwrap());
}

#[test]
fn test_facade_execute_dispatches_by_name() {
    let kb = KnowledgeBase::new(KbConfig::default()).unwrap();

    kb.execute("add", &[json!(["alfred rdf:type Human"]), json!(null), json!(0)]).unwrap();
    let result = kb
        .execute("find", &[json!(["x"]), json!(["?x rdf:type Human"]), json!(null)])
        .unwrap();
    assert_eq!(result, json!(["alfred"]));

    assert!(kb.execute("hello", &[]).unwrap().as_str().unwrap().contains("minimalkb-core"));
    assert!(kb.execute("doesNotExist", &[]).is_err());
}

#[test]
fn test_facade_clear_drops_triples_and_subscriptions() {
    let kb = KnowledgeBase::new(KbConfig::default()).unwrap();
    kb.subscribe(EventKind::NewInstance, Trigger::Persistent, "o", vec![pat("?o", "isIn", "room")], None, "client1")
        .unwrap();
    kb.add(&[Triple::new("alfred", "rdf:type", "Human")], None, 0).unwrap();

    kb.clear();

    assert!(!kb.exist(&[pat("alfred", "rdf:type", "Human")], None).unwrap());
    kb.add(&[Triple::new("batman", "isIn", "room")], None, 0).unwrap();
    // The earlier subscription was dropped by `clear`, so no notification.
    assert!(kb.poll("client1").is_empty());
}
