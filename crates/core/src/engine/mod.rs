pub mod glyphs;
pub mod matcher;
mod renderer;
pub mod rules;
mod scanner;
pub mod suppress;
mod symbols;

pub use glyphs::{SymbolCategory, SymbolEntry, SymbolTable};
pub use renderer::{render_file, render_file_ansi, Renderer};
pub use scanner::{ProjectScanner, ScanError};
pub use symbols::{FoldingBuilder, SymbolError, SymbolScanner};
