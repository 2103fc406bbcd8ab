//! Topic overlap detection
//!
//! Topics are compared after trimming and lowercasing. Overlap is a hard
//! filter: two requests without a common topic never match.

use std::collections::HashSet;

/// Normalize a single topic (trim + lowercase)
pub fn normalize_topic(topic: &str) -> String {
    topic.trim().to_lowercase()
}

/// Normalize a topic list: drops blanks and duplicates, keeps first-seen order
pub fn normalize_topics<S: AsRef<str>>(topics: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    topics
        .iter()
        .map(|t| normalize_topic(t.as_ref()))
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn normalized_set<S: AsRef<str>>(topics: &[S]) -> HashSet<String> {
    normalize_topics(topics).into_iter().collect()
}

/// Whether the two topic collections share at least one topic
pub fn has_common_topic<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let left = normalized_set(a);
    b.iter()
        .map(|t| normalize_topic(t.as_ref()))
        .any(|t| !t.is_empty() && left.contains(&t))
}

/// Topics present in both collections
///
/// Values are taken from `b` (trimmed, original casing), de-duplicated by
/// their normalized form, in `b`'s order.
pub fn common_topics<A: AsRef<str>, B: AsRef<str>>(a: &[A], b: &[B]) -> Vec<String> {
    let left = normalized_set(a);
    let mut emitted = HashSet::new();
    b.iter()
        .filter_map(|t| {
            let key = normalize_topic(t.as_ref());
            if !key.is_empty() && left.contains(&key) && emitted.insert(key) {
                Some(t.as_ref().trim().to_string())
            } else {
                None
            }
        })
        .collect()
}
