//! Pattern-based email extraction.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static RE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

/// Extract email addresses from free text.
///
/// De-duplication is exact (case-sensitive) and keeps first-occurrence
/// order. No match is a normal, empty result.
pub fn extract_emails(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    RE_EMAIL
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|email| seen.insert(*email))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extracts_in_order_without_duplicates() {
        let text = "Write to john@example.com or jane.doe+re@mail.example.org; john@example.com again";
        assert_eq!(
            extract_emails(text),
            vec!["john@example.com", "jane.doe+re@mail.example.org"]
        );
    }

    #[test]
    fn test_case_sensitive_dedup() {
        assert_eq!(
            extract_emails("John@Example.com john@example.com"),
            vec!["John@Example.com", "john@example.com"]
        );
    }

    #[test]
    fn test_no_matches() {
        assert!(extract_emails("").is_empty());
        assert!(extract_emails("no address here, just an @ sign and a.b").is_empty());
        assert!(extract_emails("user@localhost").is_empty());
    }

    #[test]
    fn test_requires_alphabetic_tld() {
        assert!(extract_emails("user@host.1").is_empty());
        assert_eq!(extract_emails("<user@host.io>"), vec!["user@host.io"]);
    }

    proptest! {
        #[test]
        fn prop_never_returns_duplicates(text in ".{0,200}") {
            let emails = extract_emails(&text);
            let unique: HashSet<_> = emails.iter().collect();
            prop_assert_eq!(unique.len(), emails.len());
        }

        #[test]
        fn prop_order_matches_first_occurrence(
            locals in prop::collection::vec("[a-z]{1,6}", 1..6),
        ) {
            let text = locals
                .iter()
                .map(|l| format!("{l}@example.com"))
                .collect::<Vec<_>>()
                .join(" , ");
            let emails = extract_emails(&text);

            let mut expected = Vec::new();
            for l in &locals {
                let email = format!("{l}@example.com");
                if !expected.contains(&email) {
                    expected.push(email);
                }
            }
            prop_assert_eq!(emails, expected);
        }
    }
}
