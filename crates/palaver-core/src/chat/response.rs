//! Accumulates streamed reply fragments into the final assistant text.

/// Builds the assistant reply one fragment at a time.
///
/// Every non-empty fragment is appended followed by a single space, so
/// `["Hi", "there"]` becomes `"Hi there "`. Empty fragments are skipped.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    text: String,
    fragments: usize,
}

impl ResponseAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and return exactly the text that was appended.
    ///
    /// Returns `None` for an empty fragment.
    pub fn push(&mut self, fragment: &str) -> Option<&str> {
        if fragment.is_empty() {
            return None;
        }
        let start = self.text.len();
        self.text.push_str(fragment);
        self.text.push(' ');
        self.fragments += 1;
        Some(&self.text[start..])
    }

    /// Number of fragments accepted so far.
    pub fn fragment_count(&self) -> usize {
        self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The accumulated text, or `None` when no fragment was accepted.
    pub fn finish(self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_joined_with_trailing_space() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.push("Hi"), Some("Hi "));
        assert_eq!(acc.push("there"), Some("there "));
        assert_eq!(acc.fragment_count(), 2);
        assert_eq!(acc.finish().as_deref(), Some("Hi there "));
    }

    #[test]
    fn test_empty_fragments_skipped() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.push(""), None);
        assert_eq!(acc.push("4"), Some("4 "));
        assert_eq!(acc.push(""), None);
        assert_eq!(acc.finish().as_deref(), Some("4 "));
    }

    #[test]
    fn test_no_fragments_finishes_empty() {
        let acc = ResponseAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.finish().is_none());
    }

    #[test]
    fn test_whitespace_fragment_is_kept() {
        let mut acc = ResponseAccumulator::new();
        assert_eq!(acc.push(" "), Some("  "));
        assert!(!acc.is_empty());
    }
}
