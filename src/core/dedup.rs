use std::collections::HashSet;

/// Drops exact repeats, keeping the first occurrence and the input order.
pub fn dedupe(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let input = strings(&["b", "a", "b", "c", "a"]);
        assert_eq!(dedupe(input), strings(&["b", "a", "c"]));
    }

    #[test]
    fn test_equality_is_exact() {
        let input = strings(&["Coverage applies.", "coverage applies.", "Coverage applies."]);
        assert_eq!(
            dedupe(input),
            strings(&["Coverage applies.", "coverage applies."])
        );
    }

    #[test]
    fn test_idempotent() {
        let once = dedupe(strings(&["x", "y", "x", "z", "y"]));
        assert_eq!(dedupe(once.clone()), once);
        assert!(dedupe(Vec::new()).is_empty());
    }
}
