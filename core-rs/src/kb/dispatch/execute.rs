//! The generic `execute(name, args)` entry point (spec.md §4.6 / §9
//! "Dynamic method dispatch"): a table of handlers built once, each
//! converting loosely-typed JSON arguments into a call against one of
//! `KnowledgeBase`'s typed methods — the static-dispatch analogue of
//! `original_source`'s `getattr(self, name)(*args)`.

use super::args;
use crate::errors::{KbError, Result};
use crate::kb::KnowledgeBase;
use crate::query::QueryResult;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;

type Handler = fn(&KnowledgeBase, &[Value]) -> Result<Value>;

fn query_result_to_value(result: QueryResult) -> Value {
    match result {
        QueryResult::Values(v) => Value::Array(v.into_iter().map(Value::String).collect()),
        QueryResult::Rows(rows) => Value::Array(
            rows.into_iter()
                .map(|row| Value::Array(row.into_iter().map(Value::String).collect()))
                .collect(),
        ),
    }
}

static HANDLERS: Lazy<HashMap<&'static str, Handler>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, Handler> = HashMap::new();

    m.insert("hello", |kb, _args| Ok(Value::String(kb.hello())));

    m.insert("load", |kb, a| {
        let path = args::as_str(a, 0)?;
        kb.load(std::path::Path::new(path))?;
        Ok(Value::Null)
    });

    m.insert("clear", |kb, _a| {
        kb.clear();
        Ok(Value::Null)
    });

    m.insert("reset", |kb, _a| {
        kb.reset();
        Ok(Value::Null)
    });

    m.insert("methods", |kb, _a| Ok(args::strings_to_value(
        &kb.methods().into_iter().map(str::to_string).collect::<Vec<_>>(),
    )));

    m.insert("listSimpleMethods", |kb, _a| Ok(args::strings_to_value(
        &kb.list_simple_methods().into_iter().map(str::to_string).collect::<Vec<_>>(),
    )));

    m.insert("check", |kb, _a| Ok(Value::Bool(kb.check())));

    m.insert("about", |kb, a| {
        let resource = args::as_str(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        Ok(args::triples_to_value(&kb.about(resource, models.as_deref())))
    });

    m.insert("details", |kb, a| {
        let resource = args::as_str(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        Ok(args::triples_to_value(&kb.details(resource, models.as_deref())))
    });

    m.insert("lookup", |kb, a| {
        let resource = args::as_str(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        Ok(args::pairs_to_value(&kb.lookup(resource, models.as_deref())))
    });

    m.insert("exist", |kb, a| {
        let patterns = args::as_patterns(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        Ok(Value::Bool(kb.exist(&patterns, models.as_deref())?))
    });

    m.insert("revise", |kb, a| {
        let stmts = args::as_stmts(a, 0)?;
        let policy = args::as_revision_policy(a, 1)?;
        kb.revise(&stmts, &policy)?;
        Ok(Value::Null)
    });

    m.insert("subscribe", |kb, a| {
        let kind = args::as_enum(a, 0)?;
        let trigger = args::as_enum(a, 1)?;
        let var = args::as_str(a, 2)?.to_string();
        let patterns = args::as_patterns(a, 3)?;
        let models = args::as_opt_models(a, 4)?;
        let client = args::as_str_or(a, 5, "execute")?;
        Ok(Value::String(kb.subscribe(kind, trigger, &var, patterns, models.as_deref(), client)?))
    });

    m.insert("add", |kb, a| {
        let stmts = args::as_stmts(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        let lifespan = args::as_u64_or(a, 2, 0)?;
        kb.add(&stmts, models.as_deref(), lifespan)?;
        Ok(Value::Null)
    });

    m.insert("retract", |kb, a| {
        let stmts = args::as_stmts(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        kb.retract(&stmts, models.as_deref())?;
        Ok(Value::Null)
    });

    m.insert("remove", |kb, a| {
        let stmts = args::as_stmts(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        kb.remove(&stmts, models.as_deref())?;
        Ok(Value::Null)
    });

    m.insert("update", |kb, a| {
        let stmts = args::as_stmts(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        let lifespan = args::as_u64_or(a, 2, 0)?;
        kb.update(&stmts, models.as_deref(), lifespan)?;
        Ok(Value::Null)
    });

    m.insert("addForAgent", |kb, a| {
        let agent = args::as_str(a, 0)?.to_string();
        let stmts = args::as_stmts(a, 1)?;
        kb.add_for_agent(&agent, &stmts)?;
        Ok(Value::Null)
    });

    m.insert("removeForAgent", |kb, a| {
        let agent = args::as_str(a, 0)?.to_string();
        let stmts = args::as_stmts(a, 1)?;
        kb.remove_for_agent(&agent, &stmts)?;
        Ok(Value::Null)
    });

    m.insert("find", |kb, a| {
        let vars = args::as_vars(a, 0)?;
        let patterns = args::as_patterns(a, 1)?;
        let models = args::as_opt_models(a, 2)?;
        Ok(query_result_to_value(kb.find(&vars, &patterns, models.as_deref())?))
    });

    m.insert("findmpe", |kb, a| {
        let vars = args::as_vars(a, 0)?;
        let patterns = args::as_patterns(a, 1)?;
        let models = args::as_opt_models(a, 2)?;
        Ok(query_result_to_value(kb.findmpe(&vars, &patterns, models.as_deref())?))
    });

    m.insert("findForAgent", |kb, a| {
        let agent = args::as_str(a, 0)?.to_string();
        let var = args::as_str(a, 1)?.to_string();
        let patterns = args::as_patterns(a, 2)?;
        Ok(query_result_to_value(kb.find_for_agent(&agent, &var, &patterns)?))
    });

    m.insert("classesof", |kb, a| {
        let concept = args::as_str(a, 0)?;
        let direct = args::as_bool_or(a, 1, false)?;
        let models = args::as_opt_models(a, 2)?;
        Ok(args::strings_to_value(&kb.classes_of(concept, direct, models.as_deref())))
    });

    m.insert("label", |kb, a| {
        let concept = args::as_str(a, 0)?;
        let models = args::as_opt_models(a, 1)?;
        Ok(Value::String(kb.label(concept, models.as_deref())))
    });

    m.insert("getLabel", |kb, a| {
        let concept = args::as_str(a, 0)?;
        Ok(Value::String(kb.get_label(concept)))
    });

    m.insert("getDirectClassesOf", |kb, a| {
        let concept = args::as_str(a, 0)?;
        Ok(args::pairs_to_value(&kb.get_direct_classes_of(concept)))
    });

    m.insert("getClassesOf", |kb, a| {
        let concept = args::as_str(a, 0)?;
        let direct = args::as_bool_or(a, 1, false)?;
        Ok(args::pairs_to_value(&kb.get_classes_of(concept, direct)))
    });

    m
});

/// Invokes the named operation with JSON-encoded arguments, warning first
/// if it's a compatibility alias (spec.md §9, `original_source`'s
/// `execute`'s `_compat` warning).
pub fn dispatch(kb: &KnowledgeBase, name: &str, args: &[Value]) -> Result<Value> {
    let info = super::lookup(name).ok_or_else(|| KbError::Unknown(name.to_string()))?;
    if info.compat {
        tracing::warn!(method = name, "using non-standard method; may be removed in the future");
    }
    let handler = HANDLERS
        .get(name)
        .ok_or_else(|| KbError::Unknown(format!("{} has no execute() handler", name)))?;
    handler(kb, args)
}
