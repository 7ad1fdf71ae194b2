//! Configuration module for the symbol scanner
//!
//! [`SymbolSettings`] is the immutable snapshot read at the start of every
//! scan. It can be persisted to and loaded from a TOML file. [`ScanConfig`]
//! and [`IgnoreFilter`] control which files a project scan visits.

use crate::models::Language;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to write settings: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Unknown symbol toggle: {0}")]
    UnknownToggle(String),
}

/// One toggle per symbol family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Toggle {
    Fn,
    Let,
    Letfn,
    Def,
    Defn,
    Doseq,
    ThreadFirst,
    ThreadLast,
    Partial,
    Comp,
    NotEqual,
    GreaterEqual,
    LessEqual,
    And,
    Or,
    Not,
    Lambda,
    Set,
    EmptySet,
    SetUnion,
    SetDifference,
    SetIntersection,
}

impl Toggle {
    pub const ALL: [Toggle; 22] = [
        Toggle::Fn,
        Toggle::Let,
        Toggle::Letfn,
        Toggle::Def,
        Toggle::Defn,
        Toggle::Doseq,
        Toggle::ThreadFirst,
        Toggle::ThreadLast,
        Toggle::Partial,
        Toggle::Comp,
        Toggle::NotEqual,
        Toggle::GreaterEqual,
        Toggle::LessEqual,
        Toggle::And,
        Toggle::Or,
        Toggle::Not,
        Toggle::Lambda,
        Toggle::Set,
        Toggle::EmptySet,
        Toggle::SetUnion,
        Toggle::SetDifference,
        Toggle::SetIntersection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Toggle::Fn => "fn",
            Toggle::Let => "let",
            Toggle::Letfn => "letfn",
            Toggle::Def => "def",
            Toggle::Defn => "defn",
            Toggle::Doseq => "doseq",
            Toggle::ThreadFirst => "thread-first",
            Toggle::ThreadLast => "thread-last",
            Toggle::Partial => "partial",
            Toggle::Comp => "comp",
            Toggle::NotEqual => "not-equal",
            Toggle::GreaterEqual => "greater-equal",
            Toggle::LessEqual => "less-equal",
            Toggle::And => "and",
            Toggle::Or => "or",
            Toggle::Not => "not",
            Toggle::Lambda => "lambda",
            Toggle::Set => "set",
            Toggle::EmptySet => "empty-set",
            Toggle::SetUnion => "set-union",
            Toggle::SetDifference => "set-difference",
            Toggle::SetIntersection => "set-intersection",
        }
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Toggle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase().replace('_', "-");
        Toggle::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownToggle(s.to_string()))
    }
}

/// Per-family enable flags, persisted under `[symbols]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SymbolToggles {
    #[serde(rename = "fn")]
    pub fn_form: bool,
    #[serde(rename = "let")]
    pub let_form: bool,
    pub letfn: bool,
    pub def: bool,
    pub defn: bool,
    pub doseq: bool,
    pub thread_first: bool,
    pub thread_last: bool,
    pub partial: bool,
    pub comp: bool,
    pub not_equal: bool,
    pub greater_equal: bool,
    pub less_equal: bool,
    pub and: bool,
    pub or: bool,
    pub not: bool,
    pub lambda: bool,
    pub set: bool,
    pub empty_set: bool,
    pub set_union: bool,
    pub set_difference: bool,
    pub set_intersection: bool,
}

impl SymbolToggles {
    /// Every family enabled
    pub fn all() -> Self {
        Self::uniform(true)
    }

    /// Every family disabled
    pub fn none() -> Self {
        Self::uniform(false)
    }

    fn uniform(on: bool) -> Self {
        Self {
            fn_form: on,
            let_form: on,
            letfn: on,
            def: on,
            defn: on,
            doseq: on,
            thread_first: on,
            thread_last: on,
            partial: on,
            comp: on,
            not_equal: on,
            greater_equal: on,
            less_equal: on,
            and: on,
            or: on,
            not: on,
            lambda: on,
            set: on,
            empty_set: on,
            set_union: on,
            set_difference: on,
            set_intersection: on,
        }
    }

    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Fn => self.fn_form,
            Toggle::Let => self.let_form,
            Toggle::Letfn => self.letfn,
            Toggle::Def => self.def,
            Toggle::Defn => self.defn,
            Toggle::Doseq => self.doseq,
            Toggle::ThreadFirst => self.thread_first,
            Toggle::ThreadLast => self.thread_last,
            Toggle::Partial => self.partial,
            Toggle::Comp => self.comp,
            Toggle::NotEqual => self.not_equal,
            Toggle::GreaterEqual => self.greater_equal,
            Toggle::LessEqual => self.less_equal,
            Toggle::And => self.and,
            Toggle::Or => self.or,
            Toggle::Not => self.not,
            Toggle::Lambda => self.lambda,
            Toggle::Set => self.set,
            Toggle::EmptySet => self.empty_set,
            Toggle::SetUnion => self.set_union,
            Toggle::SetDifference => self.set_difference,
            Toggle::SetIntersection => self.set_intersection,
        }
    }

    pub fn set(&mut self, toggle: Toggle, on: bool) {
        let slot = match toggle {
            Toggle::Fn => &mut self.fn_form,
            Toggle::Let => &mut self.let_form,
            Toggle::Letfn => &mut self.letfn,
            Toggle::Def => &mut self.def,
            Toggle::Defn => &mut self.defn,
            Toggle::Doseq => &mut self.doseq,
            Toggle::ThreadFirst => &mut self.thread_first,
            Toggle::ThreadLast => &mut self.thread_last,
            Toggle::Partial => &mut self.partial,
            Toggle::Comp => &mut self.comp,
            Toggle::NotEqual => &mut self.not_equal,
            Toggle::GreaterEqual => &mut self.greater_equal,
            Toggle::LessEqual => &mut self.less_equal,
            Toggle::And => &mut self.and,
            Toggle::Or => &mut self.or,
            Toggle::Not => &mut self.not,
            Toggle::Lambda => &mut self.lambda,
            Toggle::Set => &mut self.set,
            Toggle::EmptySet => &mut self.empty_set,
            Toggle::SetUnion => &mut self.set_union,
            Toggle::SetDifference => &mut self.set_difference,
            Toggle::SetIntersection => &mut self.set_intersection,
        };
        *slot = on;
    }
}

impl Default for SymbolToggles {
    fn default() -> Self {
        Self::all()
    }
}

/// Configuration snapshot consulted by every scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolSettings {
    /// Global switch; when off no spans are produced
    pub enabled: bool,
    /// Fold symbols inside line comments and `#_` forms
    pub show_in_comments: bool,
    /// Fold symbols inside string literals
    pub show_in_string_literals: bool,
    /// Per-family toggles
    pub symbols: SymbolToggles,
}

impl Default for SymbolSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            show_in_comments: false,
            show_in_string_literals: false,
            symbols: SymbolToggles::all(),
        }
    }
}

impl SymbolSettings {
    /// Settings with the global switch on and every family off
    pub fn only(toggles: &[Toggle]) -> Self {
        let mut symbols = SymbolToggles::none();
        for toggle in toggles {
            symbols.set(*toggle, true);
        }
        Self {
            symbols,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self, toggle: Toggle) -> bool {
        self.symbols.get(toggle)
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_show_in_comments(mut self, show: bool) -> Self {
        self.show_in_comments = show;
        self
    }

    pub fn with_show_in_string_literals(mut self, show: bool) -> Self {
        self.show_in_string_literals = show;
        self
    }

    pub fn with_toggle(mut self, toggle: Toggle, on: bool) -> Self {
        self.symbols.set(toggle, on);
        self
    }

    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load settings from a TOML file; missing keys take their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Persist settings to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

/// Configuration for a project scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root directory to scan
    pub root: PathBuf,

    /// Language filter (None = all dialects)
    pub language_filter: Option<Vec<Language>>,

    /// Custom ignore patterns
    pub ignore_patterns: Vec<String>,

    /// Path to custom ignore file
    pub ignore_file: Option<PathBuf>,

    /// Whether to include hidden files
    pub include_hidden: bool,

    /// Number of threads (0 = auto, 1 = sequential)
    pub threads: usize,

    /// Maximum file size to process (bytes)
    pub max_file_size: u64,

    /// Symbol settings applied to every file
    pub settings: SymbolSettings,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            language_filter: None,
            ignore_patterns: Vec::new(),
            ignore_file: None,
            include_hidden: false,
            threads: 0,
            max_file_size: 10 * 1024 * 1024, // 10 MB
            settings: SymbolSettings::default(),
        }
    }
}

impl ScanConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    pub fn with_language_filter(mut self, languages: Vec<Language>) -> Self {
        self.language_filter = Some(languages);
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_ignore_file(mut self, path: PathBuf) -> Self {
        self.ignore_file = Some(path);
        self
    }

    pub fn with_include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn with_settings(mut self, settings: SymbolSettings) -> Self {
        self.settings = settings;
        self
    }
}

const DEFAULT_IGNORES: &[&str] = &[
    "**/.git/**",
    "**/target/**",
    "**/node_modules/**",
    "**/.cpcache/**",
    "**/.shadow-cljs/**",
    "**/out/**",
    "**/.clj-kondo/.cache/**",
    "**/.lsp/.cache/**",
];

/// Filter for ignoring files and directories
pub struct IgnoreFilter {
    gitignore: Option<Gitignore>,
    custom_globs: GlobSet,
    default_ignores: GlobSet,
    include_hidden: bool,
}

impl IgnoreFilter {
    pub fn new(config: &ScanConfig) -> Result<Self, ConfigError> {
        let gitignore_path = config
            .ignore_file
            .clone()
            .unwrap_or_else(|| config.root.join(".gitignore"));
        let gitignore = if gitignore_path.exists() {
            let mut builder = GitignoreBuilder::new(&config.root);
            builder.add(&gitignore_path);
            builder.build().ok()
        } else {
            None
        };

        let custom_globs = Self::build_globset(config.ignore_patterns.iter().map(String::as_str))?;
        let default_ignores = Self::build_globset(DEFAULT_IGNORES.iter().copied())?;

        Ok(Self {
            gitignore,
            custom_globs,
            default_ignores,
            include_hidden: config.include_hidden,
        })
    }

    fn build_globset<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob(e.to_string()))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| ConfigError::InvalidGlob(e.to_string()))
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        let path_str = path.to_string_lossy();

        if !self.include_hidden {
            if let Some(name) = path.file_name() {
                let name = name.to_string_lossy();
                if name.starts_with('.') && name != "." && name != ".." {
                    return true;
                }
            }
        }

        if self.default_ignores.is_match(&*path_str) {
            return true;
        }

        if self.custom_globs.is_match(&*path_str) {
            return true;
        }

        if let Some(ref gi) = self.gitignore {
            if gi.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }

    /// Check if path matches language filter
    pub fn matches_language_filter(&self, path: &Path, filter: &Option<Vec<Language>>) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };

        let Some(lang) = Language::from_extension(&ext.to_string_lossy()) else {
            return false;
        };

        match filter {
            Some(langs) => langs.contains(&lang),
            None => true,
        }
    }
}
