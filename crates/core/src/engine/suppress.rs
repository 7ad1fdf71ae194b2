use crate::models::TextRange;
use crate::parsers::{SyntaxNode, DISCARD_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;

/// Shortest `"..."` run on one line. Escapes are not honoured, so a literal
/// containing `\"` ends early; folding has always behaved this way.
static STRING_LITERAL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("\"[^\"\r\u{85}\u{2028}\u{2029}]*\"").unwrap());

/// String literal spans of a scanned region, relative to the region start
#[derive(Debug, Clone, Default)]
pub struct StringLiterals {
    spans: Vec<TextRange>,
}

impl StringLiterals {
    pub fn detect(text: &str) -> Self {
        // Same byte length, so offsets stay comparable
        let normalized = text.replace('\n', " ");
        let spans = STRING_LITERAL_PATTERN
            .find_iter(&normalized)
            .map(|m| TextRange::new(m.start(), m.end()))
            .collect();
        Self { spans }
    }

    pub fn contains(&self, start: usize, end: usize) -> bool {
        self.spans.iter().any(|lit| lit.contains_span(start, end))
    }

    pub fn spans(&self) -> &[TextRange] {
        &self.spans
    }
}

/// Absolute ranges of comment and discarded forms in a host tree
#[derive(Debug, Clone, Default)]
pub struct IgnoredRanges {
    ranges: Vec<TextRange>,
}

impl IgnoredRanges {
    pub fn collect(root: &dyn SyntaxNode) -> Self {
        let mut ranges = Vec::new();
        walk(root, &mut ranges);
        Self { ranges }
    }

    pub fn contains(&self, start: usize, end: usize) -> bool {
        self.ranges.iter().any(|r| r.contains_span(start, end))
    }

    pub fn ranges(&self) -> &[TextRange] {
        &self.ranges
    }
}

fn walk(root: &dyn SyntaxNode, ranges: &mut Vec<TextRange>) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let ignored = node.is_line_comment()
            || (node.is_discard_form() && node.text().starts_with(DISCARD_MARKER));
        if ignored {
            ranges.push(node.text_range());
        }
        // Reversed so ranges come out in document order
        stack.extend(node.children().into_iter().rev());
    }
}
