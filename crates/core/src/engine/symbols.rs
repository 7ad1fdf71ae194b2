use super::glyphs::SymbolTable;
use super::matcher::candidates;
use super::rules::{rule_for, MatchContext};
use super::suppress::{IgnoredRanges, StringLiterals};
use crate::config::SymbolSettings;
use crate::models::{FoldSpan, TextRange};
use crate::parsers::SyntaxNode;
use thiserror::Error;
use tracing::{error, trace};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("No glyph registered for accepted symbol {0:?}")]
    MissingGlyph(String),
}

/// Host-facing folding interface.
///
/// Mirrors what an editor asks of a folding provider: the regions for a
/// syntax tree, the placeholder text for a node, and whether folds start
/// collapsed.
pub trait FoldingBuilder {
    /// Fold regions for the text under `root`
    fn build_fold_regions(&self, root: &dyn SyntaxNode, settings: &SymbolSettings)
        -> Vec<FoldSpan>;

    /// Placeholder override for a node; `None` means the host draws the glyph
    fn placeholder_text(&self, _node: &dyn SyntaxNode) -> Option<String> {
        None
    }

    fn is_collapsed_by_default(&self, _node: &dyn SyntaxNode) -> bool {
        true
    }
}

/// Finds pretty-symbol spans in a region of source text
#[derive(Debug, Clone, Default)]
pub struct SymbolScanner {
    table: SymbolTable,
}

impl SymbolScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol_table(table: SymbolTable) -> Self {
        Self { table }
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    /// Scan a region, failing closed: any internal inconsistency yields no spans.
    ///
    /// `text` starts at `base_offset` in the host document; returned spans and
    /// the ranges of `tree` use absolute offsets.
    pub fn scan(
        &self,
        text: &str,
        base_offset: usize,
        tree: Option<&dyn SyntaxNode>,
        settings: &SymbolSettings,
    ) -> Vec<FoldSpan> {
        match self.try_scan(text, base_offset, tree, settings) {
            Ok(spans) => spans,
            Err(e) => {
                error!(error = %e, "symbol scan aborted");
                Vec::new()
            }
        }
    }

    /// Scan a region, reporting a missing glyph instead of returning no spans
    pub fn try_scan(
        &self,
        text: &str,
        base_offset: usize,
        tree: Option<&dyn SyntaxNode>,
        settings: &SymbolSettings,
    ) -> Result<Vec<FoldSpan>, SymbolError> {
        if !settings.enabled {
            return Ok(Vec::new());
        }

        let literals = StringLiterals::detect(text);
        let ignored = tree.map(IgnoredRanges::collect).unwrap_or_default();

        let mut spans: Vec<FoldSpan> = Vec::new();

        for candidate in candidates(text) {
            let Some(ctx) = MatchContext::new(text, &candidate) else {
                continue;
            };
            let Some(rule) = rule_for(candidate.key) else {
                continue;
            };

            let resolution = rule.apply(&ctx, settings);
            if !resolution.accepted {
                continue;
            }

            let range = TextRange::new(resolution.start, resolution.end).shifted(base_offset);
            if !settings.show_in_comments && ignored.contains(range.start, range.end) {
                trace!(key = resolution.key, start = range.start, "suppressed in comment");
                continue;
            }
            if !settings.show_in_string_literals
                && literals.contains(resolution.start, resolution.end)
            {
                trace!(key = resolution.key, start = range.start, "suppressed in string literal");
                continue;
            }

            let glyph = self
                .table
                .glyph(resolution.key)
                .ok_or_else(|| SymbolError::MissingGlyph(resolution.key.to_string()))?;
            let span = FoldSpan::new(range, resolution.key, glyph);

            if spans.last().map_or(false, |prev| prev.overlaps(&span)) {
                trace!(key = resolution.key, start = range.start, "overlaps previous fold");
                continue;
            }

            trace!(key = resolution.key, start = range.start, end = range.end, glyph, "fold");
            spans.push(span);
        }

        Ok(spans)
    }
}

impl FoldingBuilder for SymbolScanner {
    fn build_fold_regions(
        &self,
        root: &dyn SyntaxNode,
        settings: &SymbolSettings,
    ) -> Vec<FoldSpan> {
        self.scan(root.text(), root.text_range().start, Some(root), settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Toggle;
    use crate::parsers::ClojureReader;

    fn scan(text: &str, settings: &SymbolSettings) -> Vec<FoldSpan> {
        let doc = ClojureReader::read(text);
        SymbolScanner::new().build_fold_regions(&doc, settings)
    }

    fn summary(spans: &[FoldSpan]) -> Vec<(usize, usize, &str)> {
        spans
            .iter()
            .map(|s| (s.start_offset, s.end_offset, s.glyph.as_str()))
            .collect()
    }

    #[test]
    fn test_and_end_to_end() {
        let spans = scan("(and true false)", &SymbolSettings::only(&[Toggle::And]));
        assert_eq!(summary(&spans), vec![(1, 4, "∧")]);
        assert_eq!(spans[0].key, "and");
        assert!(spans[0].collapsed_by_default);
    }

    #[test]
    fn test_commented_line_yields_nothing() {
        let settings = SymbolSettings::only(&[Toggle::And]);
        assert!(scan(";; (and 1 2)", &settings).is_empty());

        let settings = settings.with_show_in_comments(true);
        assert_eq!(summary(&scan(";; (and 1 2)", &settings)), vec![(4, 7, "∧")]);
    }

    #[test]
    fn test_discarded_form_is_suppressed() {
        let text = "#_(or a b) (or c d)";
        assert_eq!(
            summary(&scan(text, &SymbolSettings::default())),
            vec![(12, 14, "∨")]
        );
    }

    #[test]
    fn test_string_literal_suppression() {
        let text = r#"(println "x and y")"#;
        assert!(scan(text, &SymbolSettings::default()).is_empty());

        let settings = SymbolSettings::default().with_show_in_string_literals(true);
        assert_eq!(summary(&scan(text, &settings)), vec![(12, 15, "∧")]);
    }

    #[test]
    fn test_def_and_defn() {
        let spans = scan("(def foo 1)\n", &SymbolSettings::default());
        assert_eq!(summary(&spans), vec![(1, 4, "≡")]);

        let spans = scan("(defn foo [x] x)", &SymbolSettings::default());
        assert_eq!(summary(&spans), vec![(1, 5, "ƒ")]);
        assert_eq!(spans[0].key, "(defn");
    }

    #[test]
    fn test_qualified_set_union() {
        let settings = SymbolSettings::only(&[Toggle::SetUnion]);
        let spans = scan("(set/union a b)", &settings);
        assert_eq!(summary(&spans), vec![(5, 10, "⋃")]);
    }

    #[test]
    fn test_global_switch() {
        let settings = SymbolSettings::default().with_enabled(false);
        assert!(scan("(defn f [x] (and x (not x)))", &settings).is_empty());
    }

    #[test]
    fn test_each_family_is_gated_by_its_toggle() {
        let cases: &[(Toggle, &str, &str)] = &[
            (Toggle::Fn, "(fn [x] x)", "λ"),
            (Toggle::Let, "(let [a 1] a)", "⊢"),
            (Toggle::Letfn, "(letfn [(f [] 1)] (f))", "λ"),
            (Toggle::Def, "(def a 1)", "≡"),
            (Toggle::Defn, "(defn f [] 1)", "ƒ"),
            (Toggle::Doseq, "(doseq [x xs] x)", "∀"),
            (Toggle::ThreadFirst, "(-> x f)", "→"),
            (Toggle::ThreadLast, "(->> x f)", "⇉"),
            (Toggle::Partial, "(partial f 1)", "Ƥ"),
            (Toggle::Comp, "(comp f g)", "∘"),
            (Toggle::NotEqual, "(not= a b)", "≠"),
            (Toggle::GreaterEqual, "(>= a b)", "≥"),
            (Toggle::LessEqual, "(<= a b)", "≤"),
            (Toggle::And, "(and a b)", "∧"),
            (Toggle::Or, "(or a b)", "∨"),
            (Toggle::Not, "(not a)", "¬"),
            (Toggle::Lambda, "#(inc %)", "λ("),
            (Toggle::Set, "#{1 2}", "∈{"),
            (Toggle::EmptySet, "#{} x", "∅"),
            (Toggle::SetUnion, "(union a b)", "⋃"),
            (Toggle::SetDifference, "(difference a b)", "−"),
            (Toggle::SetIntersection, "(intersection a b)", "⋂"),
        ];

        for &(toggle, text, glyph) in cases {
            let on = scan(text, &SymbolSettings::only(&[toggle]));
            assert_eq!(on.len(), 1, "{toggle} should fold {text:?}");
            assert_eq!(on[0].glyph, glyph, "{toggle}");

            let off = scan(text, &SymbolSettings::default().with_toggle(toggle, false));
            assert!(off.is_empty(), "{toggle} disabled but {text:?} still folds");
        }
    }

    #[test]
    fn test_spans_are_ordered_in_bounds_and_disjoint() {
        let text = "(ns app.core\n  (:require [clojure.set :as set]))\n\n\
                    (defn pick [xs ys]\n  \
                    (->> xs (filter #(and (>= % 0) (not= % 9))) (set/union ys)))\n\
                    ;; (or a b)\n\
                    (def empty #{} )\n\
                    (let [s #{1 2}] (doseq [x s] (println \"x or y\" x)))\n";
        let spans = scan(text, &SymbolSettings::default());
        assert!(!spans.is_empty());

        for span in &spans {
            assert!(span.start_offset < span.end_offset);
            assert!(span.end_offset <= text.len());
        }
        for pair in spans.windows(2) {
            assert!(!pair[0].overlaps(&pair[1]));
            assert!(pair[0].end_offset <= pair[1].start_offset);
        }
        assert!(spans.iter().all(|s| s.key != "or"));
    }

    #[test]
    fn test_scan_is_idempotent() {
        let text = "(defn f [x] (and x (or x (not x))))\n(def s #{} )\n";
        let settings = SymbolSettings::default();
        assert_eq!(scan(text, &settings), scan(text, &settings));
    }

    #[test]
    fn test_base_offset_applies_to_spans_and_tree() {
        let text = "; c\n(or a b)";
        let doc = ClojureReader::read_at(text, 50);
        let spans = SymbolScanner::new().build_fold_regions(&doc, &SymbolSettings::default());
        assert_eq!(summary(&spans), vec![(55, 57, "∨")]);
    }

    #[test]
    fn test_missing_glyph_fails_closed() {
        let mut table = SymbolTable::builtin();
        table.remove("(defn");
        let scanner = SymbolScanner::with_symbol_table(table);
        let text = "(and a b)\n(defn f [] 1)";
        let settings = SymbolSettings::default();

        assert!(scanner.symbol_table().glyph("(defn").is_none());
        assert!(scanner.scan(text, 0, None, &settings).is_empty());
        assert_eq!(
            scanner.try_scan(text, 0, None, &settings),
            Err(SymbolError::MissingGlyph("(defn".to_string()))
        );
    }

    #[test]
    fn test_placeholder_and_collapse_queries() {
        let doc = ClojureReader::read("(and a b)");
        let scanner = SymbolScanner::new();
        assert_eq!(scanner.placeholder_text(&doc), None);
        assert!(scanner.is_collapsed_by_default(&doc));
    }

    #[test]
    fn test_deeply_nested_input_yields_nothing() {
        let text = "(".repeat(100_000);
        assert!(scan(&text, &SymbolSettings::default()).is_empty());
    }

    #[test]
    fn test_fold_below_deep_nesting() {
        let text = format!("{}(and a b)", "(".repeat(1_000));
        let spans = scan(&text, &SymbolSettings::default());
        assert_eq!(summary(&spans), vec![(1_001, 1_004, "∧")]);
    }
}
