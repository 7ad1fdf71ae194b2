mod json;
mod yaml;

pub use json::to_json;
pub use yaml::to_yaml;

use crate::models::{SourceFile, SymbolMap};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
    Ansi,
}

/// Format a SymbolMap according to the specified format
pub fn format_output(map: &SymbolMap, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(map),
        OutputFormat::Yaml => to_yaml(map),
        OutputFormat::Summary => Ok(format_summary(map)),
        OutputFormat::Ansi => Ok(format_summary_ansi(map)),
    }
}

fn top_files(map: &SymbolMap) -> Vec<&SourceFile> {
    let mut files: Vec<_> = map.files.iter().filter(|f| !f.folds.is_empty()).collect();
    files.sort_by(|a, b| b.folds.len().cmp(&a.folds.len()));
    files.truncate(5);
    files
}

/// Generate a human-readable summary
pub fn format_summary(map: &SymbolMap) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Symbol Fold Summary\n\
         ===================\n\
         Root: {}\n\n",
        map.root.display()
    ));

    output.push_str(&format!(
        "Files Scanned: {}\n\
         - Clojure: {}\n\
         - ClojureScript: {}\n\
         - Clojure Common: {}\n\
         - EDN: {}\n\n",
        map.stats.total_files,
        map.stats.clojure_files,
        map.stats.clojurescript_files,
        map.stats.cljc_files,
        map.stats.edn_files
    ));

    output.push_str(&format!(
        "Total Lines: {} | Files With Folds: {}\n\n",
        map.stats.total_lines, map.stats.files_with_folds
    ));

    output.push_str(&format!("Total Folds: {}\n", map.stats.total_folds));
    for (key, count) in &map.stats.by_symbol {
        output.push_str(&format!("- {}: {}\n", key, count));
    }
    output.push('\n');

    let top = top_files(map);
    if !top.is_empty() {
        output.push_str("Top files by folds:\n");
        for file in top {
            output.push_str(&format!(
                "  {} ({} folds, {} lines)\n",
                file.path.display(),
                file.folds.len(),
                file.line_count
            ));
        }
        output.push('\n');
    }

    let skipped = map.files.iter().filter(|f| !f.scanned).count();
    if skipped > 0 {
        output.push_str(&format!("Skipped Files: {}\n\n", skipped));
    }

    output.push_str(&format!(
        "Scan Duration: {}ms ({:.2} files/sec)\n\
         Timestamp: {}\n\
         Tool Version: {}\n",
        map.metadata.scan_duration_ms,
        map.metadata.files_per_second,
        map.metadata.timestamp,
        map.metadata.tool_version
    ));

    output
}

fn format_summary_ansi(map: &SymbolMap) -> String {
    let mut output = String::new();

    let bold = "\x1b[1m";
    let reset = "\x1b[0m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let dim = "\x1b[2m";

    output.push_str(&format!(
        "{}{}Symbol Fold Summary{}\n\
         {}==================={}\n\
         {}Root:{} {}\n\n",
        bold, cyan, reset, cyan, reset, dim, reset,
        map.root.display()
    ));

    output.push_str(&format!(
        "{}Files Scanned:{} {} (clj: {}, cljs: {}, cljc: {}, edn: {})\n",
        dim, reset,
        map.stats.total_files,
        map.stats.clojure_files,
        map.stats.clojurescript_files,
        map.stats.cljc_files,
        map.stats.edn_files
    ));

    output.push_str(&format!(
        "{}Total Lines:{} {} | {}With Folds:{} {}\n\n",
        dim, reset, map.stats.total_lines,
        dim, reset, map.stats.files_with_folds
    ));

    output.push_str(&format!(
        "{}Total Folds:{} {}\n",
        dim, reset, map.stats.total_folds
    ));
    for (key, count) in &map.stats.by_symbol {
        output.push_str(&format!("  {}{}{} {}\n", yellow, key, reset, count));
    }
    output.push('\n');

    output.push_str(&format!(
        "{}Scan:{} {}ms ({:.2} files/sec)\n",
        dim, reset,
        map.metadata.scan_duration_ms,
        map.metadata.files_per_second,
    ));

    output
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoldSpan, Language, ScanMetadata, SymbolStats, TextRange};
    use std::path::PathBuf;

    fn sample_map() -> SymbolMap {
        let file = SourceFile {
            path: PathBuf::from("src/app/core.clj"),
            absolute_path: PathBuf::from("/proj/src/app/core.clj"),
            language: Language::Clojure,
            folds: vec![
                FoldSpan::new(TextRange::new(1, 5), "(defn", "ƒ"),
                FoldSpan::new(TextRange::new(20, 23), "and", "∧"),
            ],
            line_count: 3,
            scanned: true,
            error: None,
        };
        let mut stats = SymbolStats::default();
        stats.add_file(&file);

        SymbolMap {
            root: PathBuf::from("/proj"),
            files: vec![file],
            stats,
            metadata: ScanMetadata::default(),
        }
    }

    #[test]
    fn test_summary_lists_symbol_counts() {
        let summary = format_summary(&sample_map());
        assert!(summary.contains("Root: /proj"));
        assert!(summary.contains("- Clojure: 1"));
        assert!(summary.contains("Total Folds: 2"));
        assert!(summary.contains("- (defn: 1"));
        assert!(summary.contains("- and: 1"));
        assert!(summary.contains("src/app/core.clj (2 folds, 3 lines)"));
        assert!(!summary.contains("Skipped Files"));
    }

    #[test]
    fn test_format_output_dispatch() {
        let map = sample_map();
        let json = format_output(&map, OutputFormat::Json).unwrap();
        assert!(json.contains("\"by_symbol\""));
        let ansi = format_output(&map, OutputFormat::Ansi).unwrap();
        assert!(ansi.contains("\x1b[1m"));
    }
}
