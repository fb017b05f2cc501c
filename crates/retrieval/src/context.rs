use std::fmt::Write;

use crate::ranker::Match;

/// Context text when nothing was retrieved
pub const NO_REFERENCES: &str = "No references retrieved.";

const DEFAULT_MAX_SUMMARY_CHARS: usize = 600;
const ELLIPSIS: char = '…';

/// Renders ranked matches into the numbered reference block handed to the
/// answering model.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    max_summary_chars: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            max_summary_chars: DEFAULT_MAX_SUMMARY_CHARS,
        }
    }
}

impl ContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound each summary to `max` chars; 0 disables truncation
    #[must_use]
    pub const fn with_max_summary_chars(mut self, max: usize) -> Self {
        self.max_summary_chars = max;
        self
    }

    #[must_use]
    pub fn build(&self, matches: &[Match]) -> String {
        if matches.is_empty() {
            return NO_REFERENCES.to_string();
        }

        let mut out = String::new();
        for (idx, m) in matches.iter().enumerate() {
            if idx > 0 {
                out.push_str("\n\n");
            }
            // Writing to a String cannot fail
            let _ = writeln!(out, "[{}] {}", idx + 1, m.title);
            let summary = self.summary(m.summary.trim());
            if !summary.is_empty() {
                let _ = writeln!(out, "Summary: {summary}");
            }
            let _ = write!(
                out,
                "Source: {}\nLast updated: {}",
                m.source,
                m.last_updated.format("%Y-%m-%d"),
            );
        }
        out
    }

    fn summary<'a>(&self, summary: &'a str) -> std::borrow::Cow<'a, str> {
        if self.max_summary_chars == 0 {
            return summary.into();
        }
        match summary.char_indices().nth(self.max_summary_chars) {
            None => summary.into(),
            Some((cut, _)) => {
                let mut truncated = summary[..cut].trim_end().to_string();
                truncated.push(ELLIPSIS);
                truncated.into()
            }
        }
    }
}

/// Render `matches` with the default builder
#[must_use]
pub fn build_context_text(matches: &[Match]) -> String {
    ContextBuilder::default().build(matches)
}
