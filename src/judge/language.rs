//! Language registry
//!
//! Static mapping between internal language identifiers and the external
//! judge's numeric language ids. Loaded once, immutable.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

/// One supported language
#[derive(Debug, Clone, Serialize)]
pub struct Language {
    /// Internal identifier, as accepted on submission requests
    pub key: &'static str,
    /// Human-readable display name
    pub name: &'static str,
    /// Numeric id understood by the external judge
    pub judge_id: i64,
}

static REGISTRY: LazyLock<HashMap<&'static str, Language>> = LazyLock::new(|| {
    [
        Language { key: "cpp", name: "C++", judge_id: 54 },
        Language { key: "js", name: "JavaScript", judge_id: 63 },
        Language { key: "rs", name: "Rust", judge_id: 73 },
    ]
    .into_iter()
    .map(|language| (language.key, language))
    .collect()
});

/// Lookup facade over the static language table
pub struct LanguageRegistry;

impl LanguageRegistry {
    /// Resolve an internal language key to its registry entry
    pub fn resolve(key: &str) -> Option<&'static Language> {
        REGISTRY.get(key)
    }

    /// All supported internal language keys
    pub fn supported_keys() -> Vec<&'static str> {
        let mut keys: Vec<_> = REGISTRY.keys().copied().collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_languages() {
        assert_eq!(LanguageRegistry::resolve("cpp").unwrap().judge_id, 54);
        assert_eq!(LanguageRegistry::resolve("js").unwrap().judge_id, 63);
        assert_eq!(LanguageRegistry::resolve("rs").unwrap().judge_id, 73);
    }

    #[test]
    fn test_unknown_language_is_absent() {
        assert!(LanguageRegistry::resolve("cobol").is_none());
    }

    #[test]
    fn test_supported_keys_are_sorted() {
        assert_eq!(LanguageRegistry::supported_keys(), vec!["cpp", "js", "rs"]);
    }
}
