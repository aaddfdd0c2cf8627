//! Section context tracking across the document.
//!
//! Headings push onto a rank stack; a new heading first pops every entry of
//! equal or deeper rank, so a rank-1 heading resets the whole context while a
//! rank-2 heading replaces only the current sub-section. The context exposed
//! to content items is the top two levels: section and sub-section.

/// Tracks the active (section, subsection) context while walking blocks in
/// document order. State is fresh per document and carries across pages.
#[derive(Debug, Default)]
pub struct SectionTracker {
    /// (rank, title) entries, shallowest first
    stack: Vec<(u8, String)>,
}

impl SectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heading of the given rank.
    ///
    /// Pops every stack entry with rank >= the new heading's rank, then
    /// pushes the heading.
    pub fn observe_heading(&mut self, rank: u8, title: impl Into<String>) {
        while self
            .stack
            .last()
            .map(|(r, _)| *r >= rank)
            .unwrap_or(false)
        {
            self.stack.pop();
        }
        self.stack.push((rank, title.into()));
    }

    /// The active (section, subsection) pair. Both are "" before the first
    /// heading; subsection is "" while only a top-level heading is active.
    pub fn current(&self) -> (String, String) {
        let section = self
            .stack
            .first()
            .map(|(_, t)| t.clone())
            .unwrap_or_default();
        let subsection = self
            .stack
            .get(1)
            .map(|(_, t)| t.clone())
            .unwrap_or_default();
        (section, subsection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_before_first_heading() {
        let tracker = SectionTracker::new();
        assert_eq!(tracker.current(), (String::new(), String::new()));
    }

    #[test]
    fn test_top_level_heading() {
        let mut tracker = SectionTracker::new();
        tracker.observe_heading(1, "Introduction");
        assert_eq!(
            tracker.current(),
            ("Introduction".to_string(), String::new())
        );
    }

    #[test]
    fn test_subsection_nests_under_section() {
        let mut tracker = SectionTracker::new();
        tracker.observe_heading(1, "Methods");
        tracker.observe_heading(2, "Sampling");
        assert_eq!(
            tracker.current(),
            ("Methods".to_string(), "Sampling".to_string())
        );
    }

    #[test]
    fn test_sibling_subsection_replaces() {
        let mut tracker = SectionTracker::new();
        tracker.observe_heading(1, "Methods");
        tracker.observe_heading(2, "Sampling");
        tracker.observe_heading(2, "Analysis");
        assert_eq!(
            tracker.current(),
            ("Methods".to_string(), "Analysis".to_string())
        );
    }

    #[test]
    fn test_new_section_clears_subsection() {
        let mut tracker = SectionTracker::new();
        tracker.observe_heading(1, "Methods");
        tracker.observe_heading(2, "Sampling");
        tracker.observe_heading(1, "Results");
        assert_eq!(tracker.current(), ("Results".to_string(), String::new()));
    }

    #[test]
    fn test_deep_heading_without_parent_becomes_section() {
        // Documents that open with a small heading still get a context.
        let mut tracker = SectionTracker::new();
        tracker.observe_heading(3, "Appendix note");
        assert_eq!(
            tracker.current(),
            ("Appendix note".to_string(), String::new())
        );
    }

    #[test]
    fn test_shallow_after_deep_pops_everything_deeper() {
        let mut tracker = SectionTracker::new();
        tracker.observe_heading(1, "A");
        tracker.observe_heading(2, "B");
        tracker.observe_heading(3, "C");
        tracker.observe_heading(2, "D");
        assert_eq!(tracker.current(), ("A".to_string(), "D".to_string()));
    }
}
