//! Symfold Core Library
//!
//! Finds Clojure forms and operators that an editor can fold into compact
//! mathematical glyphs: `(defn` becomes `ƒ`, `and` becomes `∧`, `#{}` becomes
//! `∅`, and so on.
//!
//! # Features
//!
//! - Regex candidate scan with per-symbol context rules
//! - Suppression inside comments, discarded `#_` forms and string literals
//! - Per-symbol toggles loaded from TOML settings
//! - Whole-project scans over `.clj`, `.cljs`, `.cljc`, `.edn` and `.bb` files
//! - Output in JSON, YAML, or ANSI-colored terminal format
//!
//! # Example
//!
//! ```no_run
//! use symfold_core::{format_output, OutputFormat, ProjectScanner, ScanConfig};
//! use std::path::PathBuf;
//!
//! let config = ScanConfig::new(PathBuf::from("."));
//! let scanner = ProjectScanner::new(config).unwrap();
//! let map = scanner.scan().unwrap();
//!
//! let output = format_output(&map, OutputFormat::Json).unwrap();
//! println!("{}", output);
//! ```

pub mod config;
pub mod engine;
pub mod models;
pub mod output;
pub mod parsers;

// Re-exports for convenience
pub use config::{ScanConfig, SymbolSettings, Toggle};
pub use engine::{
    render_file, render_file_ansi, FoldingBuilder, ProjectScanner, Renderer, ScanError,
    SymbolError, SymbolScanner, SymbolTable,
};
pub use models::*;
pub use output::{format_output, format_summary, FormatError, OutputFormat};
pub use parsers::{ClojureReader, SyntaxNode};
