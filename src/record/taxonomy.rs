//! Research field taxonomy splitting
//!
//! The listing renders a posting's research fields as a flat sequence of
//! text nodes in which a literal `»` node links a parent category to its
//! child, e.g. `Engineering;»;Electrical engineering;Physics`.

use std::collections::BTreeSet;

/// Token that links a parent category to the child that follows it
pub const TAXONOMY_SEPARATOR: &str = "»";

/// Main (parent) and sub (child) categories of one field string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSplit {
    pub main: BTreeSet<String>,
    pub sub: BTreeSet<String>,
}

impl FieldSplit {
    /// Main categories joined with commas
    pub fn main_joined(&self) -> String {
        join(&self.main)
    }

    /// Sub categories joined with commas
    pub fn sub_joined(&self) -> String {
        join(&self.sub)
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// Splits a `;`-delimited field string into two category levels
///
/// A token immediately followed by the separator is a main category, a token
/// immediately preceded by it is a sub category, and a token adjacent to
/// neither is also a main category. Tokens are trimmed, empty tokens are
/// dropped, and repeats collapse to one entry.
///
/// # Example
///
/// ```
/// use euraxess_harvest::record::split_field;
///
/// let split = split_field("AI;»;Robotics");
/// assert_eq!(split.main_joined(), "AI");
/// assert_eq!(split.sub_joined(), "Robotics");
/// ```
pub fn split_field(raw: &str) -> FieldSplit {
    let tokens: Vec<&str> = raw
        .split(';')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    let mut split = FieldSplit::default();

    for (i, &current) in tokens.iter().enumerate() {
        let prev = if i > 0 { tokens[i - 1] } else { "" };
        let next = tokens.get(i + 1).copied().unwrap_or("");

        if next == TAXONOMY_SEPARATOR {
            split.main.insert(current.to_string());
        } else if prev == TAXONOMY_SEPARATOR {
            split.sub.insert(current.to_string());
        } else if current != TAXONOMY_SEPARATOR {
            split.main.insert(current.to_string());
        }
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parent_and_child() {
        let split = split_field("AI;»;Robotics");
        assert_eq!(split.main, set(&["AI"]));
        assert_eq!(split.sub, set(&["Robotics"]));
    }

    #[test]
    fn test_no_separator() {
        let split = split_field("Physics");
        assert_eq!(split.main, set(&["Physics"]));
        assert!(split.sub.is_empty());
    }

    #[test]
    fn test_mixed_sequence_with_duplicates() {
        let split = split_field(
            "Engineering;»;Electrical engineering;Physics;Engineering;»;Civil engineering",
        );
        assert_eq!(split.main, set(&["Engineering", "Physics"]));
        assert_eq!(
            split.sub,
            set(&["Civil engineering", "Electrical engineering"])
        );
        assert_eq!(split.main_joined(), "Engineering,Physics");
    }

    #[test]
    fn test_whitespace_and_empty_tokens() {
        let split = split_field("  Chemistry ; ;» ;  Organic chemistry ;");
        assert_eq!(split.main, set(&["Chemistry"]));
        assert_eq!(split.sub, set(&["Organic chemistry"]));
    }

    #[test]
    fn test_empty_input() {
        let split = split_field("");
        assert!(split.main.is_empty());
        assert!(split.sub.is_empty());
        assert_eq!(split.sub_joined(), "");
    }
}
