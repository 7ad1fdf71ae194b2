use super::symbols::{FoldingBuilder, SymbolScanner};
use crate::config::{IgnoreFilter, ScanConfig};
use crate::models::{Language, ScanMetadata, SourceFile, SymbolMap, SymbolStats};
use crate::parsers::ClojureReader;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("Unsupported file extension: {0}")]
    UnsupportedFile(String),
}

/// Runs the symbol scan over every source file of a project
pub struct ProjectScanner {
    config: ScanConfig,
    ignore_filter: IgnoreFilter,
    symbols: SymbolScanner,
}

impl ProjectScanner {
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        let ignore_filter = IgnoreFilter::new(&config)?;
        Ok(Self {
            config,
            ignore_filter,
            symbols: SymbolScanner::new(),
        })
    }

    /// Scan the project and return the symbol map
    pub fn scan(&self) -> Result<SymbolMap, ScanError> {
        let start = Instant::now();

        let source_files = self.find_source_files();
        debug!(
            count = source_files.len(),
            root = %self.config.root.display(),
            "found source files"
        );

        let files: Vec<SourceFile> = if self.config.threads == 1 {
            source_files
                .iter()
                .map(|(path, lang)| self.scan_source(path, *lang))
                .collect()
        } else {
            let pool = if self.config.threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.threads)
                    .build()
                    .ok()
            } else {
                None
            };

            match pool {
                Some(pool) => pool.install(|| {
                    source_files
                        .par_iter()
                        .map(|(path, lang)| self.scan_source(path, *lang))
                        .collect()
                }),
                None => source_files
                    .par_iter()
                    .map(|(path, lang)| self.scan_source(path, *lang))
                    .collect(),
            }
        };

        let mut stats = SymbolStats::default();
        for file in &files {
            stats.add_file(file);
        }

        let duration = start.elapsed();
        let metadata = ScanMetadata {
            scan_duration_ms: duration.as_millis() as u64,
            files_per_second: if duration.as_secs_f64() > 0.0 {
                files.len() as f64 / duration.as_secs_f64()
            } else {
                0.0
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(SymbolMap {
            root: self.config.root.clone(),
            files,
            stats,
            metadata,
        })
    }

    /// Scan a single file
    pub fn scan_file(&self, path: &Path) -> Result<SourceFile, ScanError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        let lang = Language::from_extension(&ext).ok_or(ScanError::UnsupportedFile(ext))?;

        // Unlike project scans, a direct request surfaces read errors
        let content = fs::read_to_string(path)?;
        Ok(self.build_source_file(path, lang, &content))
    }

    /// Find all source files matching the language filter
    fn find_source_files(&self) -> Vec<(PathBuf, Language)> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.config.root)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !self
                        .ignore_filter
                        .should_ignore(e.path(), e.file_type().is_dir())
            });

        for entry in walker.filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                continue;
            }

            let path = entry.path();
            if !self
                .ignore_filter
                .matches_language_filter(path, &self.config.language_filter)
            {
                continue;
            }

            if let Some(lang) = path
                .extension()
                .and_then(|ext| Language::from_extension(&ext.to_string_lossy()))
            {
                files.push((path.to_path_buf(), lang));
            }
        }

        files
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.config.root)
            .unwrap_or(path)
            .to_path_buf()
    }

    fn failed_file(&self, path: &Path, language: Language, error: String) -> SourceFile {
        SourceFile {
            path: self.relative_path(path),
            absolute_path: path.to_path_buf(),
            language,
            folds: vec![],
            line_count: 0,
            scanned: false,
            error: Some(error),
        }
    }

    /// Read and scan one file; failures are recorded on the result
    fn scan_source(&self, path: &Path, language: Language) -> SourceFile {
        if let Ok(meta) = fs::metadata(path) {
            if meta.len() > self.config.max_file_size {
                debug!(path = %path.display(), size = meta.len(), "skipping large file");
                return self.failed_file(
                    path,
                    language,
                    format!("File exceeds {} bytes", self.config.max_file_size),
                );
            }
        }

        match fs::read_to_string(path) {
            Ok(content) => self.build_source_file(path, language, &content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read file");
                self.failed_file(path, language, e.to_string())
            }
        }
    }

    fn build_source_file(&self, path: &Path, language: Language, content: &str) -> SourceFile {
        let tree = ClojureReader::read(content);
        let folds = self.symbols.build_fold_regions(&tree, &self.config.settings);
        debug!(path = %path.display(), folds = folds.len(), "scanned file");

        SourceFile {
            path: self.relative_path(path),
            absolute_path: path.to_path_buf(),
            language,
            folds,
            line_count: content.lines().count(),
            scanned: true,
            error: None,
        }
    }
}
