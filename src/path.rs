// Dotted path helpers shared by documents and the stripper

/// Unique identity field present on every document.
pub const ID_FIELD: &str = "_id";

/// Revision counter added to top-level model documents.
pub const VERSION_KEY: &str = "__v";

/// Fields that are never stripped, whatever the configuration says.
pub const RESERVED_FIELDS: [&str; 2] = [ID_FIELD, VERSION_KEY];

pub fn is_reserved(path: &str) -> bool {
    RESERVED_FIELDS.contains(&path)
}

pub fn split(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

pub fn seg_is_index(seg: &str) -> Option<usize> {
    seg.parse::<usize>().ok()
}

/// True when `prefix` names an ancestor of `path` (`a` is an ancestor of `a.b`).
pub fn is_ancestor_path(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes().get(prefix.len()) == Some(&b'.')
}

pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_fields() {
        assert!(is_reserved("_id"));
        assert!(is_reserved("__v"));
        assert!(!is_reserved("id"));
        assert!(!is_reserved("address._id"));
    }

    #[test]
    fn test_ancestor_paths() {
        assert!(is_ancestor_path("a", "a.b"));
        assert!(is_ancestor_path("a.b", "a.b.c"));
        assert!(!is_ancestor_path("a", "a"));
        assert!(!is_ancestor_path("a", "ab.c"));
    }

    #[test]
    fn test_index_segments() {
        assert_eq!(seg_is_index("0"), Some(0));
        assert_eq!(seg_is_index("12"), Some(12));
        assert_eq!(seg_is_index("-1"), None);
        assert_eq!(seg_is_index("posts"), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a", "b"), "a.b");
        assert_eq!(split("a.b.c"), vec!["a", "b", "c"]);
    }
}
