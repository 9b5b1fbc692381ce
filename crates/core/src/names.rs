//! Display name sanitisation.
use super::MAX_NAME_LEN;

/// Substrings that trigger vowel redaction, checked case-insensitively.
/// Small and conservative by design — this is a lobby name filter, not a
/// moderation system.
const BANNED_SUBSTRINGS: &[&str] = &["admin", "moderator", "system", "banker", "host"];

/// Sanitises a raw display name: trim, truncate to `MAX_NAME_LEN`, and if the
/// result contains a banned substring, redact every vowel with `*`.
///
/// Idempotent: `sanitize_name(&sanitize_name(x)) == sanitize_name(x)`, since a
/// redacted name can no longer contain the vowels that made it match.
pub fn sanitize_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let truncated: String = trimmed.chars().take(MAX_NAME_LEN).collect();
    if contains_banned_substring(&truncated) {
        redact_vowels(&truncated)
    } else {
        truncated
    }
}

fn contains_banned_substring(name: &str) -> bool {
    let lower = name.to_lowercase();
    BANNED_SUBSTRINGS.iter().any(|banned| lower.contains(banned))
}

fn redact_vowels(name: &str) -> String {
    name.chars()
        .map(|c| {
            if "aeiouAEIOU".contains(c) {
                '*'
            } else {
                c
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_truncates() {
        assert_eq!(sanitize_name("  Alice  "), "Alice");
        assert_eq!(sanitize_name("ThisNameIsWayTooLong"), "ThisNameIsWayToo");
        assert_eq!(sanitize_name("ThisNameIsWayTooLong").len(), MAX_NAME_LEN);
    }

    #[test]
    fn redacts_vowels_on_banned_match() {
        let sanitized = sanitize_name("Admin");
        assert_eq!(sanitized, "*dm*n");
    }

    #[test]
    fn leaves_clean_names_alone() {
        assert_eq!(sanitize_name("Jordan"), "Jordan");
    }

    #[test]
    fn is_case_insensitive() {
        let sanitized = sanitize_name("ADMIN99");
        assert!(sanitized.chars().all(|c| !"aeiouAEIOU".contains(c)));
    }

    #[test]
    fn is_idempotent() {
        for name in ["Admin", "Jordan", "SystemCorp", "  spaced  "] {
            let once = sanitize_name(name);
            let twice = sanitize_name(&once);
            assert_eq!(once, twice);
        }
    }
}
