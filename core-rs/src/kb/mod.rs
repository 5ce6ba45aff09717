//! The knowledge base facade: orchestrates the store, the reasoner and
//! lifespan workers, and the event subsystem behind the one public
//! surface described in spec.md §4.6.

mod dispatch;

pub use dispatch::{MethodInfo, METHOD_TABLE};

use crate::config::KbConfig;
use crate::errors::{KbError, Result};
use crate::events::{EventKind, EventRegistry, Notification, Trigger};
use crate::lifespan;
use crate::query::{self, QueryResult};
use crate::reasoner;
use crate::store::{ConceptType, Pattern, Triple, TripleStore, DEFAULT_MODEL};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// The revision method a `revise` call dispatches on (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionMethod {
    Add,
    Retract,
    Update,
}

impl std::str::FromStr for RevisionMethod {
    type Err = KbError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "add" | "safe_add" => Ok(RevisionMethod::Add),
            "retract" => Ok(RevisionMethod::Retract),
            "update" | "safe_update" | "revision" => Ok(RevisionMethod::Update),
            other => Err(KbError::Server(format!("unknown revision method '{}'", other))),
        }
    }
}

/// A revision policy, as accepted by `revise` (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct RevisionPolicy {
    pub method: RevisionMethod,
    pub models: Option<Vec<String>>,
    pub lifespan: u64,
}

/// The facade state the background workers never touch directly — the
/// store itself (shared via its own `Arc<Mutex<_>>` with the workers) is
/// kept separate so a worker tick never has to contend with facade-only
/// bookkeeping.
struct Inner {
    events: EventRegistry,
    models: HashSet<String>,
    mailboxes: std::collections::HashMap<String, VecDeque<Notification>>,
}

/// Orchestrates models, revision policy, the event loop, and the
/// reasoner/lifespan background workers over one shared [`TripleStore`].
pub struct KnowledgeBase {
    store: Arc<Mutex<TripleStore>>,
    inner: Arc<Mutex<Inner>>,
    running: Arc<AtomicBool>,
    reasoner_thread: Option<std::thread::JoinHandle<()>>,
    lifespan_thread: Option<std::thread::JoinHandle<()>>,
}

impl KnowledgeBase {
    pub fn new(config: KbConfig) -> Result<Self> {
        let mut models = HashSet::new();
        models.insert(config.default_model.clone());

        let store = Arc::new(Mutex::new(TripleStore::new()));
        let inner = Arc::new(Mutex::new(Inner {
            events: EventRegistry::new(),
            models,
            mailboxes: std::collections::HashMap::new(),
        }));

        let running = Arc::new(AtomicBool::new(true));

        let reasoner_store = store.clone();
        let reasoner_running = running.clone();
        let reasoner_inner = inner.clone();
        let reasoner_store_for_callback = store.clone();
        let on_classified: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            let store_guard = reasoner_store_for_callback.lock().unwrap();
            let mut inner_guard = reasoner_inner.lock().unwrap();
            dispatch_events(&store_guard, &mut inner_guard);
        });
        let reasoner_thread = reasoner::spawn(reasoner_store, reasoner_running, config.reasoner_hz, on_classified);

        let lifespan_store = store.clone();
        let lifespan_running = running.clone();
        let lifespan_thread = lifespan::spawn(lifespan_store, lifespan_running, config.sweeper_hz);

        let bundled = crate::bootstrap::load_str(crate::bootstrap::BUNDLED_ONTOLOGY)?;
        {
            let mut guard = store.lock().unwrap();
            guard.add(&bundled, DEFAULT_MODEL, 0, false);
        }

        if let Some(path) = &config.initial_ontology {
            let triples = crate::bootstrap::load_file(path)?;
            let mut guard = store.lock().unwrap();
            guard.add(&triples, DEFAULT_MODEL, 0, false);
        }

        Ok(Self {
            store,
            inner,
            running,
            reasoner_thread: Some(reasoner_thread),
            lifespan_thread: Some(lifespan_thread),
        })
    }

    /// Version string returned by `hello` (spec.md §4.6).
    pub fn hello(&self) -> String {
        format!("minimalkb-core, v.{}", crate::VERSION)
    }

    /// Parses and loads a file of statements into `"default"` (spec.md
    /// §4.6 `load`).
    pub fn load(&self, path: &std::path::Path) -> Result<()> {
        let triples = crate::bootstrap::load_file(path)?;
        let mut guard = self.store.lock().unwrap();
        guard.add(&triples, DEFAULT_MODEL, 0, false);
        Ok(())
    }

    /// Drops all triples and active subscriptions (spec.md §4.6 `clear`,
    /// I7).
    pub fn clear(&self) {
        let mut guard = self.store.lock().unwrap();
        guard.clear();
        let mut inner = self.inner.lock().unwrap();
        inner.events.clear();
    }

    /// Names of every exposed operation (spec.md §4.6 `methods`).
    pub fn methods(&self) -> Vec<&'static str> {
        METHOD_TABLE.iter().map(|m| m.name).collect()
    }

    /// Looks up an operation by name in the method table, for adapters
    /// validating a request before dispatch (spec.md §9 "Dynamic method
    /// dispatch").
    pub fn method_info(&self, name: &str) -> Result<MethodInfo> {
        dispatch::lookup(name).ok_or_else(|| KbError::Unknown(name.to_string()))
    }

    /// Invokes an operation by name with JSON-encoded arguments, for
    /// adapters that speak to clients by method name rather than calling
    /// typed Rust methods directly (spec.md §9 "Dynamic method
    /// dispatch").
    pub fn execute(&self, name: &str, args: &[serde_json::Value]) -> Result<serde_json::Value> {
        dispatch::dispatch(self, name, args)
    }

    pub fn about(&self, resource: &str, models: Option<&[String]>) -> Vec<Triple> {
        let resolved = self.normalize_models(models);
        let guard = self.store.lock().unwrap();
        guard.about(resource, &resolved)
    }

    /// Alias of `about` (spec.md §4.6 groups `classesof / details / label`
    /// as the facade-level names for the store's `classes_of` / `about` /
    /// `label` operations).
    pub fn details(&self, resource: &str, models: Option<&[String]>) -> Vec<Triple> {
        self.about(resource, models)
    }

    /// `[(resource, "unknown")]` if `about` is non-empty, else `[]`
    /// (spec.md §4.6 `lookup`). Deliberately a coarse classification,
    /// distinct from `type_of`'s real classifier (spec.md I8).
    pub fn lookup(&self, resource: &str, models: Option<&[String]>) -> Vec<(String, String)> {
        if self.about(resource, models).is_empty() {
            Vec::new()
        } else {
            vec![(resource.to_string(), "unknown".to_string())]
        }
    }

    pub fn exist(&self, patterns: &[Pattern], models: Option<&[String]>) -> Result<bool> {
        let resolved = self.normalize_models(models);
        let guard = self.store.lock().unwrap();
        guard.has(patterns, &resolved)
    }

    /// Dispatches on `policy.method` (spec.md §4.6 `revise`), then
    /// re-evaluates every active subscription.
    pub fn revise(&self, stmts: &[Triple], policy: &RevisionPolicy) -> Result<()> {
        let models = self.normalize_models(policy.models.as_deref());
        {
            let mut guard = self.store.lock().unwrap();
            for model in &models {
                match policy.method {
                    RevisionMethod::Add => guard.add(stmts, model, policy.lifespan, false),
                    RevisionMethod::Retract => guard.delete(stmts, model),
                    RevisionMethod::Update => guard.update(stmts, model, policy.lifespan),
                }
            }
        }
        let store_guard = self.store.lock().unwrap();
        let mut inner_guard = self.inner.lock().unwrap();
        dispatch_events(&store_guard, &mut inner_guard);
        Ok(())
    }

    pub fn add(&self, stmts: &[Triple], models: Option<&[String]>, lifespan: u64) -> Result<()> {
        self.revise(
            stmts,
            &RevisionPolicy {
                method: RevisionMethod::Add,
                models: models.map(|m| m.to_vec()),
                lifespan,
            },
        )
    }

    pub fn retract(&self, stmts: &[Triple], models: Option<&[String]>) -> Result<()> {
        self.revise(
            stmts,
            &RevisionPolicy {
                method: RevisionMethod::Retract,
                models: models.map(|m| m.to_vec()),
                lifespan: 0,
            },
        )
    }

    pub fn update(&self, stmts: &[Triple], models: Option<&[String]>, lifespan: u64) -> Result<()> {
        self.revise(
            stmts,
            &RevisionPolicy {
                method: RevisionMethod::Update,
                models: models.map(|m| m.to_vec()),
                lifespan,
            },
        )
    }

    pub fn find(&self, vars: &[String], patterns: &[Pattern], models: Option<&[String]>) -> Result<QueryResult> {
        let resolved = self.normalize_models(models);
        let guard = self.store.lock().unwrap();
        query::find(&guard, vars, patterns, &resolved)
    }

    /// Alias of `find` (spec.md Non-goals: probabilistic inference is out
    /// of scope, so `findmpe` is exactly `find`).
    pub fn findmpe(&self, vars: &[String], patterns: &[Pattern], models: Option<&[String]>) -> Result<QueryResult> {
        self.find(vars, patterns, models)
    }

    pub fn subscribe(
        &self,
        kind: EventKind,
        trigger: Trigger,
        var: &str,
        patterns: Vec<Pattern>,
        models: Option<&[String]>,
        client: &str,
    ) -> Result<String> {
        let resolved = self.normalize_models(models);
        let store_guard = self.store.lock().unwrap();
        let mut inner_guard = self.inner.lock().unwrap();
        inner_guard.mailboxes.entry(client.to_string()).or_default();
        inner_guard
            .events
            .subscribe(&store_guard, kind, trigger, var, patterns, resolved, client)
    }

    /// Drains (and removes) every pending notification for `client`.
    pub fn poll(&self, client: &str) -> Vec<Notification> {
        let mut inner_guard = self.inner.lock().unwrap();
        match inner_guard.mailboxes.get_mut(client) {
            Some(queue) => queue.drain(..).collect(),
            None => Vec::new(),
        }
    }

    pub fn classes_of(&self, concept: &str, direct: bool, models: Option<&[String]>) -> Vec<String> {
        let resolved = self.normalize_models(models);
        let guard = self.store.lock().unwrap();
        guard.classes_of(concept, direct, &resolved)
    }

    /// Compatibility alias for `clear` (`original_source`'s `kb.py::reset`).
    pub fn reset(&self) {
        self.clear();
    }

    /// Compatibility alias for `methods` (`kb.py::listSimpleMethods`).
    pub fn list_simple_methods(&self) -> Vec<&'static str> {
        self.methods()
    }

    /// Compatibility no-op: no classification is implemented, so this
    /// always answers `true` (`kb.py::check`, which does the same).
    pub fn check(&self) -> bool {
        tracing::warn!("'check' invoked, but no classification is supported; returning true");
        true
    }

    /// Compatibility alias for `retract` (`kb.py::remove`).
    pub fn remove(&self, stmts: &[Triple], models: Option<&[String]>) -> Result<()> {
        self.retract(stmts, models)
    }

    /// Compatibility sugar: `add` scoped to a single agent model
    /// (`kb.py::addForAgent`).
    pub fn add_for_agent(&self, agent: &str, stmts: &[Triple]) -> Result<()> {
        self.add(stmts, Some(&[agent.to_string()]), 0)
    }

    /// Compatibility sugar: `retract` scoped to a single agent model
    /// (`kb.py::removeForAgent`).
    pub fn remove_for_agent(&self, agent: &str, stmts: &[Triple]) -> Result<()> {
        self.retract(stmts, Some(&[agent.to_string()]))
    }

    /// Compatibility sugar: `find` scoped to a single agent model
    /// (`kb.py::findForAgent`).
    pub fn find_for_agent(&self, agent: &str, var: &str, patterns: &[Pattern]) -> Result<QueryResult> {
        self.find(&[var.to_string()], patterns, Some(&[agent.to_string()]))
    }

    /// Compatibility alias for `label` with the knowledge base's full
    /// known-model set (`kb.py::getLabel`).
    pub fn get_label(&self, concept: &str) -> String {
        self.label(concept, None)
    }

    /// Compatibility alias for `get_classes_of(concept, true)`
    /// (`kb.py::getDirectClassesOf`).
    pub fn get_direct_classes_of(&self, concept: &str) -> Vec<(String, String)> {
        self.get_classes_of(concept, true)
    }

    /// Compatibility wrapper pairing each class with its label
    /// (`kb.py::getClassesOf`).
    pub fn get_classes_of(&self, concept: &str, direct: bool) -> Vec<(String, String)> {
        self.classes_of(concept, direct, None)
            .into_iter()
            .map(|cls| {
                let label = self.get_label(&cls);
                (cls, label)
            })
            .collect()
    }

    pub fn label(&self, concept: &str, models: Option<&[String]>) -> String {
        let resolved = self.normalize_models(models);
        let mut guard = self.store.lock().unwrap();
        guard.label(concept, &resolved)
    }

    pub fn type_of(&self, concept: &str, models: Option<&[String]>) -> ConceptType {
        let resolved = self.normalize_models(models);
        let mut guard = self.store.lock().unwrap();
        guard.type_of(concept, &resolved)
    }

    /// A models argument of `None`, empty, or containing `"all"`
    /// resolves to every known model; otherwise the named models are
    /// added to the known set and used as-is (spec.md §4.6 "Model
    /// normalization").
    fn normalize_models(&self, models: Option<&[String]>) -> HashSet<String> {
        let mut inner = self.inner.lock().unwrap();
        match models {
            None => inner.models.clone(),
            Some(m) if m.is_empty() || m.iter().any(|s| s == "all") => inner.models.clone(),
            Some(m) => {
                let requested: HashSet<String> = m.iter().cloned().collect();
                inner.models.extend(requested.iter().cloned());
                requested
            }
        }
    }
}

fn dispatch_events(store: &TripleStore, inner: &mut Inner) {
    for n in inner.events.evaluate(store) {
        inner.mailboxes.entry(n.client.clone()).or_default().push_back(n);
    }
}

impl Drop for KnowledgeBase {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(h) = self.reasoner_thread.take() {
            let _ = h.join();
        }
        if let Some(h) = self.lifespan_thread.take() {
            let _ = h.join();
        }
    }
}
