//! Internal-namespace classification

use crate::types::NamespaceActivity;
use regex::Regex;
use std::sync::LazyLock;

/// `::impl`, `::internal`, `foo_impl`, `rtc_internal`, ending at a word boundary
static INTERNAL_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[A-Za-z0-9_]_|::)(?:impl|internal)\b").expect("valid regex literal")
});

/// Whether a displayed activity key names an implementation-internal namespace
pub fn is_internal_namespace(key: &str) -> bool {
    INTERNAL_NAMESPACE.is_match(key)
}

/// True when every activity key is internal. Zero keys is vacuously true;
/// the `#define` key never matches.
pub fn is_internal_only(activity: &NamespaceActivity) -> bool {
    activity
        .keys()
        .all(|key| is_internal_namespace(&key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;

    #[test]
    fn test_internal_namespace_patterns() {
        assert!(is_internal_namespace("webrtc::internal"));
        assert!(is_internal_namespace("ns::impl"));
        assert!(is_internal_namespace("webrtc::rtc_impl"));
        assert!(is_internal_namespace("webrtc::internal::detail"));
        assert!(!is_internal_namespace("webrtc"));
        assert!(!is_internal_namespace("impl"));
        assert!(!is_internal_namespace("ns::implementation"));
        assert!(!is_internal_namespace("ns::internals"));
        assert!(!is_internal_namespace(""));
        assert!(!is_internal_namespace("#define"));
    }

    #[test]
    fn test_empty_activity_is_internal_only() {
        assert!(is_internal_only(&NamespaceActivity::new()));
    }

    #[test]
    fn test_macros_make_header_public() {
        let text = "#define LOG 1\nnamespace ns {\nnamespace impl {\nint x;\n}\n}\n";
        let parsed = parse_source("a.h", text).unwrap();
        assert!(!is_internal_only(&parsed.namespace_activity));
    }

    #[test]
    fn test_internal_only_header() {
        let text = "namespace ns {\nnamespace impl {\nclass Helper;\n}\n}\n";
        let parsed = parse_source("impl/b.h", text).unwrap();
        assert!(is_internal_only(&parsed.namespace_activity));
    }

    #[test]
    fn test_global_declaration_makes_header_public() {
        let text = "int global_counter;\nnamespace ns {\nnamespace internal {\nint x;\n}\n}\n";
        let parsed = parse_source("x.h", text).unwrap();
        assert!(!is_internal_only(&parsed.namespace_activity));
    }
}
