//! The facade's method table (spec.md §9 "Dynamic method dispatch"):
//! built once, listing every client-visible operation name instead of
//! discovering them through runtime reflection.

#[derive(Debug, Clone, Copy)]
pub struct MethodInfo {
    pub name: &'static str,
    /// A compatibility alias kept for older clients, not part of the
    /// primary surface (spec.md §4.6).
    pub compat: bool,
}

const fn m(name: &'static str, compat: bool) -> MethodInfo {
    MethodInfo { name, compat }
}

pub static METHOD_TABLE: &[MethodInfo] = &[
    m("hello", false),
    m("load", false),
    m("clear", false),
    m("methods", false),
    m("about", false),
    m("details", false),
    m("lookup", false),
    m("exist", false),
    m("revise", false),
    m("add", false),
    m("retract", false),
    m("update", false),
    m("find", false),
    m("findmpe", false),
    m("subscribe", false),
    m("classesof", false),
    m("label", false),
    m("reset", true),
    m("check", true),
    m("listSimpleMethods", true),
    m("remove", true),
    m("addForAgent", true),
    m("removeForAgent", true),
    m("findForAgent", true),
    m("getLabel", true),
    m("getDirectClassesOf", true),
    m("getClassesOf", true),
];

/// Looks up a method by name, for adapters that need to validate a
/// request before invoking the matching facade operation.
pub fn lookup(name: &str) -> Option<MethodInfo> {
    METHOD_TABLE.iter().copied().find(|m| m.name == name)
}

mod args;
mod execute;

pub(super) use execute::dispatch;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_finds_primary_method() {
        let info = lookup("find").unwrap();
        assert!(!info.compat);
    }

    #[test]
    fn test_lookup_finds_compat_alias() {
        let info = lookup("reset").unwrap();
        assert!(info.compat);
    }

    #[test]
    fn test_lookup_unknown_method() {
        assert!(lookup("doesNotExist").is_none());
    }

    #[test]
    fn test_no_duplicate_method_names() {
        let mut names: Vec<&str> = METHOD_TABLE.iter().map(|m| m.name).collect();
        let len_before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), len_before);
    }
}
