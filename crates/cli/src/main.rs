use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use symfold_core::{
    format_output, render_file, render_file_ansi, Language, OutputFormat, ProjectScanner,
    ScanConfig, SymbolSettings, SymbolTable, Toggle,
};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "mta_rust_prettysymbol_symfold")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pretty-symbol folding preview for Clojure projects")]
#[command(long_about = "Finds Clojure forms and operators that an editor can fold into \
    mathematical glyphs and reports them per file:\n\n\
    - (fn, (defn, (let, (letfn, (def, (doseq\n\
    - threading macros (-> and (->>\n\
    - and, or, not, not=, >=, <=\n\
    - partial, comp and #( lambdas\n\
    - set literals and set/union, set/difference, set/intersection\n\n\
    Symbols inside comments, #_ forms and string literals are left alone unless enabled.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Project root directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Json)]
    pub format: OutputFormatArg,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only scan specific dialect
    #[arg(long, value_enum)]
    pub language: Option<LanguageFilter>,

    /// Additional ignore patterns (gitignore style)
    #[arg(long, action = clap::ArgAction::Append)]
    pub ignore: Vec<String>,

    /// Ignore file path (defaults to .gitignore)
    #[arg(long)]
    pub ignore_file: Option<PathBuf>,

    /// Include hidden files and directories
    #[arg(long)]
    pub hidden: bool,

    /// Symbol settings file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fold only these symbols (comma-separated: fn,let,defn,and,set-union,...)
    #[arg(long, global = true)]
    pub enable: Option<String>,

    /// Never fold these symbols
    #[arg(long, global = true)]
    pub disable: Option<String>,

    /// Fold symbols inside comments and #_ forms
    #[arg(long, global = true)]
    pub show_in_comments: bool,

    /// Fold symbols inside string literals
    #[arg(long, global = true)]
    pub show_in_strings: bool,

    /// Turn symbol folding off entirely
    #[arg(long, global = true)]
    pub off: bool,

    /// Disable colours in terminal output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Show progress and logs (-vv for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Parallel threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project and show fold statistics
    Analyze {
        /// Project root directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Ansi)]
        format: OutputFormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render a single file with folds applied
    Render {
        /// File to render
        file: PathBuf,

        /// Output with ANSI colors
        #[arg(long)]
        ansi: bool,
    },

    /// List all symbol folds in a file
    List {
        /// File to analyze
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Summary)]
        format: OutputFormatArg,
    },

    /// Print the symbol table
    Symbols,

    /// Write a settings file with every default spelled out
    InitConfig {
        /// Destination path
        #[arg(default_value = "symfold.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Summary,
    Ansi,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Summary => OutputFormat::Summary,
            OutputFormatArg::Ansi => OutputFormat::Ansi,
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LanguageFilter {
    Clj,
    Cljs,
    Cljc,
    Edn,
}

impl From<&LanguageFilter> for Language {
    fn from(filter: &LanguageFilter) -> Self {
        match filter {
            LanguageFilter::Clj => Language::Clojure,
            LanguageFilter::Cljs => Language::ClojureScript,
            LanguageFilter::Cljc => Language::ClojureCommon,
            LanguageFilter::Edn => Language::Edn,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match &args.command {
        Some(Commands::Analyze {
            path,
            format,
            output,
        }) => run_analyze(path.clone(), format.clone(), output.clone(), &args),
        Some(Commands::Render { file, ansi }) => run_render(file, *ansi, &args),
        Some(Commands::List { file, format }) => run_list(file, format.clone(), &args),
        Some(Commands::Symbols) => run_symbols(),
        Some(Commands::InitConfig { path, force }) => run_init_config(path, *force),
        None => run_scan(&args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Resolve symbol settings from `--config` and the command-line overrides
fn build_settings(args: &Args) -> anyhow::Result<SymbolSettings> {
    let mut settings = match args.config {
        Some(ref path) => SymbolSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => SymbolSettings::default(),
    };

    if let Some(ref names) = args.enable {
        settings.symbols = SymbolSettings::only(&parse_toggles(names)?).symbols;
    }

    if let Some(ref names) = args.disable {
        for toggle in parse_toggles(names)? {
            settings = settings.with_toggle(toggle, false);
        }
    }

    if args.show_in_comments {
        settings = settings.with_show_in_comments(true);
    }
    if args.show_in_strings {
        settings = settings.with_show_in_string_literals(true);
    }
    if args.off {
        settings = settings.with_enabled(false);
    }

    debug!(?settings, "resolved symbol settings");
    Ok(settings)
}

fn parse_toggles(names: &str) -> anyhow::Result<Vec<Toggle>> {
    let mut toggles = Vec::new();
    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if name == "all" {
            toggles.extend_from_slice(&Toggle::ALL);
        } else {
            toggles.push(name.parse::<Toggle>()?);
        }
    }
    Ok(toggles)
}

fn write_output(output: &str, path: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    if let Some(path) = path {
        fs::write(path, output)?;
        if verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{}", output);
    }
    Ok(())
}

fn run_scan(args: &Args) -> anyhow::Result<()> {
    let mut config = ScanConfig::new(args.path.clone())
        .with_ignore_patterns(args.ignore.clone())
        .with_include_hidden(args.hidden)
        .with_threads(args.threads)
        .with_settings(build_settings(args)?);

    if let Some(ref language) = args.language {
        config = config.with_language_filter(vec![language.into()]);
    }

    if let Some(ref ignore_file) = args.ignore_file {
        config = config.with_ignore_file(ignore_file.clone());
    }

    let spinner = if args.verbose > 0 {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Scanning project...");
        Some(pb)
    } else {
        None
    };

    let scanner = ProjectScanner::new(config)?;
    let result = scanner.scan()?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Scanned {} files in {}ms",
            result.stats.total_files, result.metadata.scan_duration_ms
        ));
    }

    let output = format_output(&result, args.format.clone().into())?;
    write_output(&output, args.output.as_deref(), args.verbose > 0)
}

fn run_analyze(
    path: PathBuf,
    format: OutputFormatArg,
    output_file: Option<PathBuf>,
    args: &Args,
) -> anyhow::Result<()> {
    let config = ScanConfig::new(path)
        .with_threads(args.threads)
        .with_settings(build_settings(args)?);

    let scanner = ProjectScanner::new(config)?;
    let result = scanner.scan()?;

    let mut output_format: OutputFormat = format.into();
    if output_format == OutputFormat::Ansi && (args.no_color || !atty::is(atty::Stream::Stdout)) {
        output_format = OutputFormat::Summary;
    }

    let output = format_output(&result, output_format)?;
    write_output(&output, output_file.as_deref(), args.verbose > 0)
}

fn run_render(file: &Path, ansi: bool, args: &Args) -> anyhow::Result<()> {
    let settings = build_settings(args)?;

    let rendered = if ansi || (atty::is(atty::Stream::Stdout) && !args.no_color) {
        render_file_ansi(file, &settings)?
    } else {
        render_file(file, &settings)?
    };

    print!("{}", rendered.content);

    if args.verbose > 0 {
        eprintln!(
            "\n--- {} folds applied, {} bytes hidden ---",
            rendered.fold_count, rendered.bytes_hidden
        );
    }

    Ok(())
}

fn run_list(file: &Path, format: OutputFormatArg, args: &Args) -> anyhow::Result<()> {
    let config = ScanConfig::default().with_settings(build_settings(args)?);
    let scanner = ProjectScanner::new(config)?;
    let source_file = scanner.scan_file(file)?;

    let output = match format {
        OutputFormatArg::Json => serde_json::to_string_pretty(&source_file)?,
        OutputFormatArg::Yaml => serde_yaml::to_string(&source_file)?,
        OutputFormatArg::Summary | OutputFormatArg::Ansi => {
            let mut out = String::new();
            out.push_str(&format!(
                "File: {}\nLanguage: {}\nLine Count: {}\nFolds: {}\n\n",
                source_file.path.display(),
                source_file.language.as_str(),
                source_file.line_count,
                source_file.folds.len()
            ));

            for (i, fold) in source_file.folds.iter().enumerate() {
                out.push_str(&format!(
                    "{}. {} -> {} (bytes {}-{})\n",
                    i + 1,
                    fold.key,
                    fold.glyph,
                    fold.start_offset,
                    fold.end_offset
                ));
            }

            out
        }
    };

    println!("{}", output);
    Ok(())
}

fn run_symbols() -> anyhow::Result<()> {
    let table = SymbolTable::builtin();
    for (key, entry) in table.entries() {
        println!("{:<14} {:<3} {:?}", key, entry.glyph, entry.category);
    }
    Ok(())
}

fn run_init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    SymbolSettings::default()
        .save(path)
        .with_context(|| format!("writing settings to {}", path.display()))?;
    eprintln!("Settings written to: {}", path.display());
    Ok(())
}
