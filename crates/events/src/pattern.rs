//! Glob matching for topic subscriptions.
//!
//! Supports the subset of Redis `PSUBSCRIBE` syntax the pipeline relies on:
//! `*` matches any run of characters (including none) and `?` matches
//! exactly one character. Everything else matches literally.

/// Whether `topic` matches the glob `pattern`.
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let topic: Vec<char> = topic.chars().collect();

    let (mut p, mut t) = (0usize, 0usize);
    // Position of the last `*` seen and the topic index it was tried at.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < topic.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some('?') => {
                p += 1;
                t += 1;
            }
            Some(&c) if c == topic[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    backtrack = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_suffix() {
        assert!(topic_matches("logs:*", "logs:abc"));
        assert!(topic_matches("logs:*", "logs:"));
        assert!(topic_matches("logs:*", "logs:brave-quiet-harbor"));
        assert!(!topic_matches("logs:*", "metrics:abc"));
        assert!(!topic_matches("logs:*", "logs"));
    }

    #[test]
    fn literal_pattern_matches_exactly() {
        assert!(topic_matches("logs:abc", "logs:abc"));
        assert!(!topic_matches("logs:abc", "logs:abcd"));
    }

    #[test]
    fn question_mark_matches_single_char() {
        assert!(topic_matches("logs:a?c", "logs:abc"));
        assert!(!topic_matches("logs:a?c", "logs:ac"));
    }

    #[test]
    fn inner_star_backtracks() {
        assert!(topic_matches("*:build:*", "logs:build:abc"));
        assert!(topic_matches("a*b*c", "aXbYbZc"));
        assert!(!topic_matches("a*b*c", "aXbYbZ"));
    }
}
