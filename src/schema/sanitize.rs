//! Identifier sanitization for table and column names

/// Keep only ASCII letters, digits and underscores, in their original order.
///
/// Other characters are dropped, not replaced. Two different inputs may
/// sanitize to the same identifier; callers that need uniqueness must check.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_subsequence(needle: &str, haystack: &str) -> bool {
        let mut rest = haystack.chars();
        needle.chars().all(|c| rest.any(|h| h == c))
    }

    #[test]
    fn test_sanitize_simple() {
        assert_eq!(sanitize_identifier("name"), "name");
        assert_eq!(sanitize_identifier("First Name"), "FirstName");
        assert_eq!(sanitize_identifier("unit_price($)"), "unit_price");
        assert_eq!(sanitize_identifier("a-b-c"), "abc");
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize_identifier("café"), "caf");
        assert_eq!(sanitize_identifier("数量"), "");
        assert_eq!(sanitize_identifier("@#$"), "");
    }

    #[test]
    fn test_sanitize_collisions_are_not_resolved_here() {
        assert_eq!(sanitize_identifier("a b"), sanitize_identifier("a-b"));
    }

    #[test]
    fn test_output_is_safe_subsequence() {
        let inputs = [
            "",
            "plain",
            "with space",
            "Table.Name;DROP TABLE x;--",
            "`quoted`",
            "\"dq\"",
            "tab\tand\nnewline",
            "mixé ünïcode 123",
            "___",
            "9lives",
        ];
        for input in inputs {
            let out = sanitize_identifier(input);
            assert!(
                out.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'),
                "unsafe char in {:?}",
                out
            );
            assert!(is_subsequence(&out, input), "{:?} not a subsequence of {:?}", out, input);
        }
    }
}
