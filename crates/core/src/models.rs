use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Half-open byte range `[start, end)` in source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Check if this range fully contains `[start, end]`, inclusive at both ends
    pub fn contains_span(&self, start: usize, end: usize) -> bool {
        self.start <= start && end <= self.end
    }

    /// Shift the range right by `offset` bytes
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

/// A span of source text the host should display as a single glyph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldSpan {
    /// Absolute start byte offset
    pub start_offset: usize,
    /// Absolute end byte offset (exclusive)
    pub end_offset: usize,
    /// Canonical symbol key, e.g. `(defn` or `and`
    pub key: String,
    /// Replacement glyph shown while folded
    pub glyph: String,
    /// Folds are offered collapsed
    pub collapsed_by_default: bool,
}

impl FoldSpan {
    pub fn new(range: TextRange, key: &str, glyph: &str) -> Self {
        Self {
            start_offset: range.start,
            end_offset: range.end,
            key: key.to_string(),
            glyph: glyph.to_string(),
            collapsed_by_default: true,
        }
    }

    pub fn range(&self) -> TextRange {
        TextRange::new(self.start_offset, self.end_offset)
    }

    pub fn len(&self) -> usize {
        self.range().len()
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    /// Check if this span overlaps with another
    pub fn overlaps(&self, other: &FoldSpan) -> bool {
        self.start_offset < other.end_offset && self.end_offset > other.start_offset
    }
}

/// Dialect of the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Clojure,
    ClojureScript,
    ClojureCommon,
    Edn,
}

impl Language {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "clj" | "bb" => Some(Language::Clojure),
            "cljs" => Some(Language::ClojureScript),
            "cljc" => Some(Language::ClojureCommon),
            "edn" => Some(Language::Edn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Clojure => "clojure",
            Language::ClojureScript => "clojurescript",
            Language::ClojureCommon => "cljc",
            Language::Edn => "edn",
        }
    }
}

/// A source file with its symbol folds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Relative path from project root
    pub path: PathBuf,
    /// Absolute path
    pub absolute_path: PathBuf,
    /// Detected dialect
    pub language: Language,
    /// All symbol folds in this file, in document order
    pub folds: Vec<FoldSpan>,
    /// Total line count
    pub line_count: usize,
    /// Whether the file was scanned successfully
    pub scanned: bool,
    /// Read error or skip reason, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Statistics about a project scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolStats {
    pub total_files: usize,
    pub files_with_folds: usize,
    pub total_folds: usize,
    pub total_lines: usize,
    pub clojure_files: usize,
    pub clojurescript_files: usize,
    pub cljc_files: usize,
    pub edn_files: usize,
    /// Fold count per symbol key
    pub by_symbol: BTreeMap<String, usize>,
}

impl SymbolStats {
    pub fn add_file(&mut self, file: &SourceFile) {
        self.total_files += 1;
        self.total_lines += file.line_count;

        match file.language {
            Language::Clojure => self.clojure_files += 1,
            Language::ClojureScript => self.clojurescript_files += 1,
            Language::ClojureCommon => self.cljc_files += 1,
            Language::Edn => self.edn_files += 1,
        }

        if !file.folds.is_empty() {
            self.files_with_folds += 1;
        }

        for fold in &file.folds {
            self.add_fold(fold);
        }
    }

    pub fn add_fold(&mut self, fold: &FoldSpan) {
        self.total_folds += 1;
        *self.by_symbol.entry(fold.key.clone()).or_insert(0) += 1;
    }
}

/// Scan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_duration_ms: u64,
    pub files_per_second: f64,
    pub timestamp: String,
    pub tool_version: String,
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            scan_duration_ms: 0,
            files_per_second: 0.0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Aggregated results of a project scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolMap {
    /// Project root path
    pub root: PathBuf,
    /// All source files analyzed
    pub files: Vec<SourceFile>,
    /// Fold statistics
    pub stats: SymbolStats,
    /// Scan metadata
    pub metadata: ScanMetadata,
}

/// Rendered output for a single file
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub path: PathBuf,
    pub content: String,
    pub fold_count: usize,
    /// Bytes of source hidden behind glyphs
    pub bytes_hidden: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, key: &str) -> FoldSpan {
        FoldSpan::new(TextRange::new(start, end), key, "x")
    }

    #[test]
    fn test_range_containment_is_inclusive() {
        let range = TextRange::new(2, 8);
        assert!(range.contains_span(2, 8));
        assert!(range.contains_span(3, 5));
        assert!(!range.contains_span(1, 5));
        assert!(!range.contains_span(5, 9));
    }

    #[test]
    fn test_fold_span_defaults_collapsed() {
        let fold = span(1, 4, "and");
        assert!(fold.collapsed_by_default);
        assert_eq!(fold.len(), 3);
    }

    #[test]
    fn test_overlaps() {
        assert!(span(0, 4, "a").overlaps(&span(3, 6, "b")));
        assert!(!span(0, 3, "a").overlaps(&span(3, 6, "b")));
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("clj"), Some(Language::Clojure));
        assert_eq!(Language::from_extension("CLJS"), Some(Language::ClojureScript));
        assert_eq!(Language::from_extension("cljc"), Some(Language::ClojureCommon));
        assert_eq!(Language::from_extension("edn"), Some(Language::Edn));
        assert_eq!(Language::from_extension("py"), None);
    }

    #[test]
    fn test_stats_count_by_symbol() {
        let file = SourceFile {
            path: PathBuf::from("a.clj"),
            absolute_path: PathBuf::from("/p/a.clj"),
            language: Language::Clojure,
            folds: vec![span(1, 4, "and"), span(10, 13, "and"), span(20, 22, "or")],
            line_count: 3,
            scanned: true,
            error: None,
        };

        let mut stats = SymbolStats::default();
        stats.add_file(&file);

        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.files_with_folds, 1);
        assert_eq!(stats.total_folds, 3);
        assert_eq!(stats.by_symbol.get("and"), Some(&2));
        assert_eq!(stats.by_symbol.get("or"), Some(&1));
        assert_eq!(stats.clojure_files, 1);
    }
}
