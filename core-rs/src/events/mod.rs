//! The event subsystem: standing queries ("subscriptions") re-evaluated
//! after every committed mutation, enqueuing notifications per client
//! (spec.md §4.3).

use crate::errors::Result;
use crate::hash::digest_hex;
use crate::query;
use crate::store::{Pattern, TripleStore};
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NewInstance,
    NewClassInstance,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::NewInstance => "NEW_INSTANCE",
            EventKind::NewClassInstance => "NEW_CLASS_INSTANCE",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for EventKind {
    type Err = crate::errors::KbError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "NEW_INSTANCE" => Ok(EventKind::NewInstance),
            "NEW_CLASS_INSTANCE" => Ok(EventKind::NewClassInstance),
            other => Err(crate::errors::KbError::Parse(format!("unknown event kind '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Persistent,
    OneShot,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trigger::Persistent => "persistent",
            Trigger::OneShot => "ONE_SHOT",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Trigger {
    type Err = crate::errors::KbError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "persistent" => Ok(Trigger::Persistent),
            "ONE_SHOT" => Ok(Trigger::OneShot),
            other => Err(crate::errors::KbError::Parse(format!("unknown trigger discipline '{}'", other))),
        }
    }
}

/// A standing query: what it watches, who's watching, and what it has
/// already reported (spec.md §3 "Subscription (event)").
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: String,
    pub kind: EventKind,
    pub trigger: Trigger,
    pub var: String,
    pub patterns: Vec<Pattern>,
    pub models: HashSet<String>,
    seen: HashSet<String>,
    pub valid: bool,
    pub clients: Vec<String>,
}

/// One fired event, ready to be pushed to a client's mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub client: String,
    pub event_id: String,
    pub content: Vec<String>,
}

fn subscription_id(kind: EventKind, trigger: Trigger, var: &str, patterns: &[Pattern], models: &HashSet<String>) -> String {
    let mut pattern_strs: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    pattern_strs.sort();
    let mut model_strs: Vec<String> = models.iter().cloned().collect();
    model_strs.sort();

    let mut fields: Vec<&str> = vec![];
    let kind_str = kind.to_string();
    let trigger_str = trigger.to_string();
    fields.push(&kind_str);
    fields.push(&trigger_str);
    fields.push(var);
    for p in &pattern_strs {
        fields.push(p);
    }
    for m in &model_strs {
        fields.push(m);
    }
    format!("evt_{}", digest_hex(&fields))
}

/// Holds every active subscription, keyed by its deterministic id so that
/// structurally identical subscriptions collapse (spec.md I6).
#[derive(Default)]
pub struct EventRegistry {
    subscriptions: HashMap<String, Subscription>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every subscription (spec.md I7: `clear()` also drops
    /// subscriptions).
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    /// Registers a new subscription, or appends `client` to an existing
    /// one if an identical `(kind, trigger, var, patterns, models)` tuple
    /// is already active (spec.md §4.3).
    #[allow(clippy::too_many_arguments)]
    pub fn subscribe(
        &mut self,
        store: &TripleStore,
        kind: EventKind,
        trigger: Trigger,
        var: &str,
        patterns: Vec<Pattern>,
        models: HashSet<String>,
        client: &str,
    ) -> Result<String> {
        let id = subscription_id(kind, trigger, var, &patterns, &models);

        if let Some(existing) = self.subscriptions.get_mut(&id) {
            if !existing.clients.iter().any(|c| c == client) {
                existing.clients.push(client.to_string());
            }
            return Ok(id);
        }

        let seen: HashSet<String> = query::find(store, &[var.to_string()], &patterns, &models)?
            .into_values()
            .into_iter()
            .collect();

        self.subscriptions.insert(
            id.clone(),
            Subscription {
                id: id.clone(),
                kind,
                trigger,
                var: var.to_string(),
                patterns,
                models,
                seen,
                valid: true,
                clients: vec![client.to_string()],
            },
        );
        Ok(id)
    }

    /// Re-evaluates every active subscription against `store`, producing
    /// notifications for whatever newly fired. `ONE_SHOT` subscriptions are
    /// only invalidated (and removed) on the tick they actually fire
    /// (spec.md §4.3 step 4) — unlike the system this is ported from, which
    /// invalidates `ONE_SHOT` subscriptions unconditionally on every tick.
    pub fn evaluate(&mut self, store: &TripleStore) -> Vec<Notification> {
        let mut notifications = Vec::new();
        let mut fired_one_shots = Vec::new();

        for sub in self.subscriptions.values_mut() {
            let result = match query::find(store, std::slice::from_ref(&sub.var), &sub.patterns, &sub.models) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let current: HashSet<String> = result.into_values().into_iter().collect();
            let new: Vec<String> = current.difference(&sub.seen).cloned().collect();
            if new.is_empty() {
                continue;
            }

            sub.seen = sub.seen.union(&current).cloned().collect();
            for client in &sub.clients {
                notifications.push(Notification {
                    client: client.clone(),
                    event_id: sub.id.clone(),
                    content: new.clone(),
                });
            }

            if sub.trigger == Trigger::OneShot {
                sub.valid = false;
                fired_one_shots.push(sub.id.clone());
            }
        }

        for id in fired_one_shots {
            self.subscriptions.remove(&id);
        }

        notifications
    }

    pub fn get(&self, id: &str) -> Option<&Subscription> {
        self.subscriptions.get(id)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
