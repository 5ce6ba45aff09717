//! Deterministic content hashing for quad identity and subscription ids.
//!
//! Quad identity must be stable across process restarts (spec §9 "Hashing
//! keying"): we can't use `std::collections::hash_map::RandomState` or any
//! other per-process-seeded hasher here. `xxh3_64` is a fast, stable,
//! non-cryptographic hash — the same algorithm clarium uses for its
//! content-addressed ETags.

use xxhash_rust::xxh3::xxh3_64;

const SEP: u8 = 0;

/// Identity digest of a quad: `H(subject, predicate, object, model)`.
pub fn quad_hash(subject: &str, predicate: &str, object: &str, model: &str) -> u64 {
    let mut buf = Vec::with_capacity(subject.len() + predicate.len() + object.len() + model.len() + 4);
    for part in [subject, predicate, object, model] {
        buf.extend_from_slice(part.as_bytes());
        buf.push(SEP);
    }
    xxh3_64(&buf)
}

/// Hex-encoded digest over an arbitrary set of canonicalized fields, used
/// for deterministic subscription ids (`H(kind, trigger, var, sorted
/// patterns, sorted models)`).
pub fn digest_hex(fields: &[&str]) -> String {
    let mut buf = Vec::new();
    for f in fields {
        buf.extend_from_slice(f.as_bytes());
        buf.push(SEP);
    }
    hex::encode(xxh3_64(&buf).to_be_bytes())
}
