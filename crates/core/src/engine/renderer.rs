use super::glyphs::{SymbolCategory, SymbolTable};
use super::symbols::{FoldingBuilder, SymbolScanner};
use crate::config::SymbolSettings;
use crate::models::{FoldSpan, Language, RenderedFile};
use crate::parsers::ClojureReader;
use ropey::Rope;
use std::fs;
use std::path::Path;
use termcolor::Color;

/// Renders source text with symbol folds collapsed into their glyphs
pub struct Renderer {
    table: SymbolTable,
}

impl Renderer {
    pub fn new(table: SymbolTable) -> Self {
        Self { table }
    }

    /// Render with folds applied, returning plain text
    pub fn render(&self, source: &str, folds: &[FoldSpan]) -> String {
        self.render_with(source, folds, |fold| fold.glyph.clone())
    }

    /// Render with glyphs coloured by symbol category
    pub fn render_ansi(&self, source: &str, folds: &[FoldSpan]) -> String {
        self.render_with(source, folds, |fold| self.format_glyph_ansi(fold))
    }

    fn render_with<F>(&self, source: &str, folds: &[FoldSpan], placeholder: F) -> String
    where
        F: Fn(&FoldSpan) -> String,
    {
        if folds.is_empty() {
            return source.to_string();
        }

        let rope = Rope::from_str(source);
        let mut result = String::with_capacity(source.len());

        let mut sorted: Vec<&FoldSpan> = folds.iter().collect();
        sorted.sort_by_key(|f| f.start_offset);

        let mut current_byte = 0;

        for fold in sorted {
            // Overlapping or out of range spans are left as source text
            if fold.start_offset < current_byte || fold.end_offset > source.len() {
                continue;
            }

            if fold.start_offset > current_byte {
                let start_char = rope.byte_to_char(current_byte);
                let end_char = rope.byte_to_char(fold.start_offset);
                result.push_str(&rope.slice(start_char..end_char).to_string());
            }

            result.push_str(&placeholder(fold));
            current_byte = fold.end_offset;
        }

        if current_byte < source.len() {
            let start_char = rope.byte_to_char(current_byte);
            result.push_str(&rope.slice(start_char..).to_string());
        }

        result
    }

    fn format_glyph_ansi(&self, fold: &FoldSpan) -> String {
        let reset = "\x1b[0m";
        let fg_color = match self.color_for(&fold.key) {
            Color::Blue => "\x1b[34m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Magenta => "\x1b[35m",
            Color::Cyan => "\x1b[36m",
            _ => "\x1b[90m",
        };

        format!("{}{}{}", fg_color, fold.glyph, reset)
    }

    fn color_for(&self, key: &str) -> Color {
        match self.table.get(key).map(|entry| entry.category) {
            Some(SymbolCategory::Binding) => Color::Blue,
            Some(SymbolCategory::Function) => Color::Magenta,
            Some(SymbolCategory::Logic) => Color::Yellow,
            Some(SymbolCategory::Comparison) => Color::Cyan,
            Some(SymbolCategory::Set) => Color::Green,
            None => Color::White,
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(SymbolTable::builtin())
    }
}

fn scan_path(
    scanner: &SymbolScanner,
    path: &Path,
    settings: &SymbolSettings,
) -> Result<(String, Vec<FoldSpan>), std::io::Error> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();

    if Language::from_extension(&ext).is_none() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Unsupported file type",
        ));
    }

    let content = fs::read_to_string(path)?;
    let tree = ClojureReader::read(&content);
    let folds = scanner.build_fold_regions(&tree, settings);
    Ok((content, folds))
}

fn rendered(path: &Path, content: String, folds: &[FoldSpan]) -> RenderedFile {
    RenderedFile {
        path: path.to_path_buf(),
        content,
        fold_count: folds.len(),
        bytes_hidden: folds.iter().map(FoldSpan::len).sum(),
    }
}

/// Render a file with folds applied (convenience function)
pub fn render_file(path: &Path, settings: &SymbolSettings) -> Result<RenderedFile, std::io::Error> {
    let scanner = SymbolScanner::new();
    let (content, folds) = scan_path(&scanner, path, settings)?;
    let output = Renderer::new(scanner.symbol_table().clone()).render(&content, &folds);
    Ok(rendered(path, output, &folds))
}

/// Render a file with ANSI colours (convenience function)
pub fn render_file_ansi(
    path: &Path,
    settings: &SymbolSettings,
) -> Result<RenderedFile, std::io::Error> {
    let scanner = SymbolScanner::new();
    let (content, folds) = scan_path(&scanner, path, settings)?;
    let output = Renderer::new(scanner.symbol_table().clone()).render_ansi(&content, &folds);
    Ok(rendered(path, output, &folds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TextRange;
    use tempfile::tempdir;

    fn fold(start: usize, end: usize, key: &str, glyph: &str) -> FoldSpan {
        FoldSpan::new(TextRange::new(start, end), key, glyph)
    }

    #[test]
    fn test_renderer_no_folds() {
        let source = "(+ 1 2)";
        assert_eq!(Renderer::default().render(source, &[]), source);
    }

    #[test]
    fn test_renderer_replaces_spans() {
        let source = "(defn f [a b] (and a b))";
        let folds = [fold(1, 5, "(defn", "ƒ"), fold(15, 18, "and", "∧")];
        assert_eq!(Renderer::default().render(source, &folds), "(ƒ f [a b] (∧ a b))");
    }

    #[test]
    fn test_renderer_handles_multibyte_text() {
        let source = "(str \"héllo\" (not x))";
        let start = source.find("not").unwrap();
        let folds = [fold(start, start + 3, "not", "¬")];
        assert_eq!(Renderer::default().render(source, &folds), "(str \"héllo\" (¬ x))");
    }

    #[test]
    fn test_renderer_skips_overlapping_spans() {
        let source = "(and a b)";
        let folds = [fold(1, 4, "and", "∧"), fold(2, 5, "or", "∨")];
        assert_eq!(Renderer::default().render(source, &folds), "(∧ a b)");
    }

    #[test]
    fn test_render_ansi_colours_glyphs() {
        let output = Renderer::default().render_ansi("(or a b)", &[fold(1, 3, "or", "∨")]);
        assert_eq!(output, "(\x1b[33m∨\x1b[0m a b)");
    }

    #[test]
    fn test_render_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.clj");
        fs::write(&path, "(defn f [x]\n  (not x))\n").unwrap();

        let rendered = render_file(&path, &SymbolSettings::default()).unwrap();
        assert_eq!(rendered.content, "(ƒ f [x]\n  (¬ x))\n");
        assert_eq!(rendered.fold_count, 2);
        assert_eq!(rendered.bytes_hidden, 7);
    }

    #[test]
    fn test_render_file_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("core.py");
        fs::write(&path, "and").unwrap();

        let err = render_file(&path, &SymbolSettings::default()).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
