use once_cell::sync::Lazy;
use regex::Regex;

/// Every literal form that may start a fold. Order matters: the first
/// alternative that matches at a position wins, so `not=` precedes `not`.
static SYMBOL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\(fn|\(let|\(->|\(def|\(doseq|partial|comp|not=|and|or|not|>=|<=|#\(|#\{|union|difference|intersection",
    )
    .unwrap()
});

/// A raw regex hit, before any context rules run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Matched text, e.g. `(def` or `union`
    pub key: &'a str,
    pub match_start: usize,
    pub match_end: usize,
    /// First byte of the foldable span; skips a leading `(`
    pub start: usize,
}

impl Candidate<'_> {
    /// Context rules look two characters past the match
    pub fn has_lookahead(&self, text: &str) -> bool {
        text.get(self.match_end..)
            .map_or(false, |rest| rest.chars().nth(1).is_some())
    }
}

/// Scan `text` left to right for non-overlapping symbol candidates
pub fn candidates(text: &str) -> impl Iterator<Item = Candidate<'_>> {
    SYMBOL_PATTERN.find_iter(text).map(|m| {
        let key = m.as_str();
        let start = if key.starts_with('(') {
            m.start() + 1
        } else {
            m.start()
        };
        Candidate {
            key,
            match_start: m.start(),
            match_end: m.end(),
            start,
        }
    })
}
