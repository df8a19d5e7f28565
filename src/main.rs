//! Yomeru command-line tool
//!
//! Tokenizes Japanese text, marks known vocabulary, searches the vocabulary
//! database and reconciles stored entries onto dictionary forms.

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use yomeru_core::analyzer::Analyzer;
use yomeru_core::matcher::annotate;
use yomeru_core::models::ReconcileParams;
use yomeru_core::output::{
    print_furigana_summary, print_plan, print_summary, print_units, print_vocab,
    write_furigana_plan, write_furigana_plan_file, write_json, write_plan, write_plan_file,
    PlanFormat,
};
use yomeru_core::reconcile::{apply_furigana_plan, apply_plan, reconcile, reconcile_furigana};
use yomeru_core::search::search_vocab;
use yomeru_core::sentence::{derive_title, sentence_window};
use yomeru_core::store::{SqliteVocabStore, VocabStore};
use yomeru_core::tokenize::tokenize;

#[derive(Parser)]
#[command(name = "yomeru")]
#[command(about = "Japanese reading assistant: tokenization and vocabulary tools")]
#[command(version)]
struct Cli {
    /// Only log warnings and errors (RUST_LOG overrides)
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for unit sequences and search hits
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable lines
    Plain,
}

/// Output format for plans (CLI version, mirrors output::PlanFormat)
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CliPlanFormat {
    /// Pretty-printed JSON report
    Json,
    /// One row per entry
    Csv,
    /// One line per entry needing attention
    Plain,
}

impl From<CliPlanFormat> for PlanFormat {
    fn from(format: CliPlanFormat) -> Self {
        match format {
            CliPlanFormat::Json => PlanFormat::Json,
            CliPlanFormat::Csv => PlanFormat::Csv,
            CliPlanFormat::Plain => PlanFormat::Plain,
        }
    }
}

/// Options for the morphological analyzer
#[derive(clap::Args, Debug)]
struct EngineArgs {
    /// zstd-compressed system dictionary (system.dic.zst)
    #[arg(long)]
    dictionary: PathBuf,

    /// Drop whitespace tokens inside a line [default: false]
    #[arg(long)]
    ignore_space: bool,

    /// Longest run of unknown characters grouped into one token [default: 0, no limit]
    #[arg(long)]
    max_grouping_len: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize a text (file or stdin)
    Tokenize {
        #[command(flatten)]
        engine: EngineArgs,

        /// Input text file [default: stdin]
        #[arg(long)]
        input: Option<PathBuf>,

        /// Print the sentence around unit N instead of the unit list
        #[arg(long)]
        sentence_at: Option<usize>,

        #[arg(long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Mark the units of a text that are already in the vocabulary
    Known {
        #[command(flatten)]
        engine: EngineArgs,

        /// Path to the vocabulary database
        #[arg(long)]
        db: PathBuf,

        /// Input text file [default: stdin]
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Search the vocabulary (word, furigana, meaning, notes)
    Search {
        /// Path to the vocabulary database
        #[arg(long)]
        db: PathBuf,

        /// Query; kana and full-width insensitive. Empty lists everything
        #[arg(default_value = "")]
        query: String,

        #[arg(long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Plan (and optionally apply) dictionary-form rewrites of stored words
    Reconcile {
        #[command(flatten)]
        engine: EngineArgs,

        /// Path to the vocabulary database
        #[arg(long)]
        db: PathBuf,

        /// Write the plan here instead of stdout (format from --format)
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: CliPlanFormat,

        /// Persist the planned updates
        #[arg(long)]
        apply: bool,

        /// Classify entries one at a time instead of on the thread pool
        #[arg(long)]
        sequential: bool,

        /// Keep proposed furigana in katakana as the analyzer reports it
        #[arg(long)]
        katakana_furigana: bool,

        /// Print first N notable plan entries to console
        #[arg(long)]
        show_entries: Option<usize>,
    },

    /// Plan (and optionally apply) katakana-to-hiragana furigana rewrites
    Furigana {
        /// Path to the vocabulary database
        #[arg(long)]
        db: PathBuf,

        /// Write the plan here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: CliPlanFormat,

        /// Persist the planned updates
        #[arg(long)]
        apply: bool,
    },

    /// Import vocabulary from a JSON array
    Import {
        /// Path to the vocabulary database (created if missing)
        #[arg(long)]
        db: PathBuf,

        /// JSON file: [{"word": ..., "furigana": ..., "meaning": ..., "notes": ...}]
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Tokenize {
            engine,
            input,
            sentence_at,
            format,
        } => {
            let analyzer = load_analyzer(&engine)?;
            let text = read_input(input.as_deref())?;
            let units = tokenize(&*analyzer, &text)?;
            info!(units = units.len(), title = ?derive_title(&text), "Tokenized");

            if let Some(index) = sentence_at {
                let window = sentence_window(&units, index)?;
                match format {
                    OutputFormat::Json => write_json(&window, &mut std::io::stdout())?,
                    OutputFormat::Plain => println!("{}", window.text),
                }
            } else {
                match format {
                    OutputFormat::Json => write_json(&units, &mut std::io::stdout())?,
                    OutputFormat::Plain => print_units(&annotate(&units, &[])),
                }
            }
        }

        Commands::Known {
            engine,
            db,
            input,
            format,
        } => {
            let analyzer = load_analyzer(&engine)?;
            let store = SqliteVocabStore::open(&db)?;
            let vocab = store.list_vocab()?;
            let text = read_input(input.as_deref())?;

            let units = tokenize(&*analyzer, &text)?;
            let annotated = annotate(&units, &vocab);
            info!(
                units = units.len(),
                known = annotated.iter().filter(|a| a.known).count(),
                "Annotated"
            );

            match format {
                OutputFormat::Json => write_json(&annotated, &mut std::io::stdout())?,
                OutputFormat::Plain => print_units(&annotated),
            }
        }

        Commands::Search { db, query, format } => {
            let store = SqliteVocabStore::open(&db)?;
            let vocab = store.list_vocab()?;
            let found = search_vocab(&query, &vocab);

            match format {
                OutputFormat::Json => write_json(&found, &mut std::io::stdout())?,
                OutputFormat::Plain => print_vocab(&found),
            }
        }

        Commands::Reconcile {
            engine,
            db,
            output,
            format,
            apply,
            sequential,
            katakana_furigana,
            show_entries,
        } => {
            let defaults = ReconcileParams::default();
            let params = ReconcileParams {
                parallel: !sequential && defaults.parallel,
                hiragana_furigana: !katakana_furigana && defaults.hiragana_furigana,
            };

            let analyzer = load_analyzer(&engine)?;
            let mut store = SqliteVocabStore::open(&db)?;
            let vocab = store.list_vocab()?;
            let report = reconcile(&*analyzer, &vocab, &params, !cli.quiet)?;

            match &output {
                Some(path) => {
                    write_plan_file(&report, format.into(), path)?;
                    eprintln!("Plan output: {}", path.display());
                }
                None => write_plan(&report, format.into(), &mut std::io::stdout())?,
            }

            // Console reports only when stdout is not carrying JSON or CSV
            if stdout_is_free(output.as_deref(), format) {
                if !cli.quiet {
                    print_summary(&report);
                }

                if let Some(limit) = show_entries {
                    println!("\n=== Plan Entries ===");
                    print_plan(&report.entries, Some(limit));
                }
            }

            if apply {
                let applied = apply_plan(&mut store, &report)?;
                eprintln!("Applied {} updates", applied.applied);
            }
        }

        Commands::Furigana {
            db,
            output,
            format,
            apply,
        } => {
            let mut store = SqliteVocabStore::open(&db)?;
            let plan = reconcile_furigana(&store.list_vocab()?);

            match &output {
                Some(path) => {
                    write_furigana_plan_file(&plan, format.into(), path)?;
                    eprintln!("Plan output: {}", path.display());
                }
                None => write_furigana_plan(&plan, format.into(), &mut std::io::stdout())?,
            }

            if !cli.quiet && stdout_is_free(output.as_deref(), format) {
                print_furigana_summary(&plan);
            }

            if apply {
                let applied = apply_furigana_plan(&mut store, &plan)?;
                eprintln!("Applied {} updates", applied.applied);
            }
        }

        Commands::Import { db, input } => {
            let mut store = SqliteVocabStore::open(&db)?;
            let imported = store.import_json(&input)?;
            println!("Imported {} entries ({} total)", imported, store.count()?);
        }
    }

    Ok(())
}

/// True unless a machine-readable plan is being written to stdout.
fn stdout_is_free(output: Option<&Path>, format: CliPlanFormat) -> bool {
    output.is_some() || format == CliPlanFormat::Plain
}

/// Read the input text from a file, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, std::io::Error> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

#[cfg(feature = "vibrato")]
fn load_analyzer(args: &EngineArgs) -> Result<Box<dyn Analyzer + Sync>, Box<dyn Error>> {
    use yomeru_core::engine::{adapter, EngineConfig};

    let defaults = EngineConfig::new(&args.dictionary);
    let config = EngineConfig {
        ignore_space: args.ignore_space || defaults.ignore_space,
        max_grouping_len: args.max_grouping_len.unwrap_or(defaults.max_grouping_len),
        ..defaults
    };

    let analyzer = adapter(config);
    analyzer.warm_up()?;
    Ok(Box::new(analyzer))
}

#[cfg(not(feature = "vibrato"))]
fn load_analyzer(args: &EngineArgs) -> Result<Box<dyn Analyzer + Sync>, Box<dyn Error>> {
    Err(format!(
        "cannot load {}: yomeru was built without the `vibrato` feature",
        args.dictionary.display()
    )
    .into())
}
