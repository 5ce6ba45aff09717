//! Converts the loosely-typed `serde_json::Value` arguments `execute`
//! receives into the concrete types the facade's typed methods expect,
//! the same way `original_source`'s `execute(name, *args)` hands Python
//! objects straight to `getattr(self, name)`.

use crate::errors::{KbError, Result};
use crate::statement;
use crate::store::{Pattern, Triple};
use serde_json::Value;

pub fn get(args: &[Value], i: usize) -> Result<&Value> {
    args.get(i)
        .ok_or_else(|| KbError::Server(format!("missing argument at position {}", i)))
}

pub fn as_str(args: &[Value], i: usize) -> Result<&str> {
    get(args, i)?
        .as_str()
        .ok_or_else(|| KbError::TypeMismatch(format!("argument {} must be a string", i)))
}

pub fn as_enum<T: std::str::FromStr<Err = KbError>>(args: &[Value], i: usize) -> Result<T> {
    as_str(args, i)?.parse()
}

pub fn as_str_or<'a>(args: &'a [Value], i: usize, default: &'a str) -> Result<&'a str> {
    match args.get(i) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_str()
            .ok_or_else(|| KbError::TypeMismatch(format!("argument {} must be a string", i))),
    }
}

pub fn as_u64_or(args: &[Value], i: usize, default: u64) -> Result<u64> {
    match args.get(i) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| KbError::TypeMismatch(format!("argument {} must be a non-negative integer", i))),
    }
}

pub fn as_stmts(args: &[Value], i: usize) -> Result<Vec<Triple>> {
    match get(args, i)? {
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| KbError::TypeMismatch(format!("statement at argument {} must be a string", i)))
                    .and_then(statement::parse_statement)
            })
            .collect(),
        _ => Err(KbError::TypeMismatch(format!("argument {} must be an array of statement strings", i))),
    }
}

pub fn as_patterns(args: &[Value], i: usize) -> Result<Vec<Pattern>> {
    match get(args, i)? {
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .ok_or_else(|| KbError::TypeMismatch(format!("pattern at argument {} must be a string", i)))
                    .and_then(statement::parse_pattern)
            })
            .collect(),
        _ => Err(KbError::TypeMismatch(format!("argument {} must be an array of pattern strings", i))),
    }
}

pub fn as_vars(args: &[Value], i: usize) -> Result<Vec<String>> {
    match get(args, i)? {
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(|s| s.to_string())
                    .ok_or_else(|| KbError::TypeMismatch(format!("variable name at argument {} must be a string", i)))
            })
            .collect(),
        _ => Err(KbError::TypeMismatch(format!("argument {} must be an array of variable names", i))),
    }
}

pub fn as_opt_models(args: &[Value], i: usize) -> Result<Option<Vec<String>>> {
    match args.get(i) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(
            items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| s.to_string())
                        .ok_or_else(|| KbError::TypeMismatch(format!("model at argument {} must be a string", i)))
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        _ => Err(KbError::TypeMismatch(format!("argument {} must be an array of model names, or null", i))),
    }
}

pub fn as_bool_or(args: &[Value], i: usize, default: bool) -> Result<bool> {
    match args.get(i) {
        None | Some(Value::Null) => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| KbError::TypeMismatch(format!("argument {} must be a boolean", i))),
    }
}

pub fn as_revision_policy(args: &[Value], i: usize) -> Result<crate::kb::RevisionPolicy> {
    let obj = get(args, i)?
        .as_object()
        .ok_or_else(|| KbError::TypeMismatch(format!("argument {} must be a policy object", i)))?;
    let method = obj
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| KbError::Server("policy is missing a 'method' field".to_string()))?
        .parse()?;
    let models = match obj.get("models") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(|s| s.to_string())
                        .ok_or_else(|| KbError::TypeMismatch("policy.models must be an array of strings".to_string()))
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        _ => return Err(KbError::TypeMismatch("policy.models must be an array of strings, or null".to_string())),
    };
    let lifespan = obj.get("lifespan").and_then(Value::as_u64).unwrap_or(0);
    Ok(crate::kb::RevisionPolicy { method, models, lifespan })
}

pub fn triples_to_value(triples: &[Triple]) -> Value {
    Value::Array(triples.iter().map(|t| Value::String(t.to_string())).collect())
}

pub fn strings_to_value(strings: &[String]) -> Value {
    Value::Array(strings.iter().cloned().map(Value::String).collect())
}

pub fn pairs_to_value(pairs: &[(String, String)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(a, b)| Value::Array(vec![Value::String(a.clone()), Value::String(b.clone())]))
            .collect(),
    )
}
