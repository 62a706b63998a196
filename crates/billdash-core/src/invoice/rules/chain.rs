//! Ordered fallback strategies.
//!
//! Each strategy is a pure function over the document text. They are tried
//! in order and the first one that produces a value wins.

use tracing::trace;

/// A named matcher in a fallback chain.
pub struct Strategy<T> {
    /// Name reported in logs and extraction results.
    pub name: &'static str,
    /// Matcher returning a value when its pattern applies.
    pub run: fn(&str) -> Option<T>,
}

impl<T> Strategy<T> {
    pub const fn new(name: &'static str, run: fn(&str) -> Option<T>) -> Self {
        Self { name, run }
    }
}

/// Run `strategies` in order and return the first hit with its strategy name.
pub fn first_match<T>(text: &str, strategies: &[Strategy<T>]) -> Option<(&'static str, T)> {
    strategies.iter().find_map(|strategy| {
        let hit = (strategy.run)(text);
        trace!("strategy {}: {}", strategy.name, if hit.is_some() { "hit" } else { "miss" });
        hit.map(|value| (strategy.name, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(text: &str) -> Option<u32> {
        text.split_whitespace().find_map(|w| w.parse().ok())
    }

    fn always_seven(_: &str) -> Option<u32> {
        Some(7)
    }

    fn never(_: &str) -> Option<u32> {
        None
    }

    #[test]
    fn test_first_hit_short_circuits() {
        let chain = [
            Strategy::new("never", never),
            Strategy::new("digits", digits),
            Strategy::new("seven", always_seven),
        ];

        assert_eq!(first_match("total 42", &chain), Some(("digits", 42)));
        assert_eq!(first_match("no numbers", &chain), Some(("seven", 7)));
    }

    #[test]
    fn test_empty_chain_misses() {
        let chain: [Strategy<u32>; 0] = [];
        assert_eq!(first_match("anything", &chain), None);
    }
}
