//! Yomeru Core Library
//!
//! Text processing for a Japanese reading assistant: line-aware
//! tokenization, sentence extraction, vocabulary matching on dictionary
//! forms, script normalization for search, and reconciliation of stored
//! vocabulary onto dictionary forms.
//!
//! The morphological analyzer is consumed through the [`analyzer::Analyzer`]
//! trait. A vibrato-backed engine is available behind the `vibrato` feature;
//! [`analyzer::LexiconAnalyzer`] works from an in-memory word list.
//!
//! # Example
//!
//! ```no_run
//! use yomeru_core::prelude::*;
//!
//! let analyzer = LexiconAnalyzer::new()
//!     .with_entry("学生", "名詞,一般,*,*,*,*,学生,ガクセイ,ガクセー")
//!     .with_entry("です", "助動詞,*,*,*,特殊・デス,基本形,です,デス,デス")
//!     .with_entry("。", "記号,句点,*,*,*,*,。,。,。");
//!
//! let units = tokenize(&analyzer, "学生です。\n学生です。").unwrap();
//! assert_eq!(reconstruct(&units), "学生です。\n学生です。");
//!
//! let sentence = extract_sentence(&units, 0).unwrap();
//! println!("{}", sentence);
//! ```
//!
//! # Reconciliation Example
//!
//! ```no_run
//! use yomeru_core::prelude::*;
//! use std::path::Path;
//!
//! let analyzer = LexiconAnalyzer::new()
//!     .with_entry("食べた", "動詞,自立,*,*,一段,連用タ接続,食べる,タベタ,タベタ")
//!     .with_entry("食べる", "動詞,自立,*,*,一段,基本形,食べる,タベル,タベル");
//!
//! let mut store = SqliteVocabStore::open(Path::new("vocab.db")).unwrap();
//! let vocab = store.list_vocab().unwrap();
//!
//! // Nothing is written until the plan is applied
//! let report = reconcile(&analyzer, &vocab, &ReconcileParams::default(), false).unwrap();
//! for planned in report.updates() {
//!     println!("{} -> {:?}", planned.entry.word, planned.action);
//! }
//! apply_plan(&mut store, &report).unwrap();
//! ```

pub mod analyzer;
#[cfg(feature = "vibrato")]
pub mod engine;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod output;
pub mod reconcile;
pub mod search;
pub mod sentence;
pub mod store;
pub mod tokenize;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::analyzer::{
        parse_ipadic_feature, Adapter, AnalyzedToken, Analyzer, AnalyzerError, LexiconAnalyzer,
        Serialized,
    };
    #[cfg(feature = "vibrato")]
    pub use crate::engine::{EngineConfig, VibratoAnalyzer};
    pub use crate::matcher::{annotate, is_known, known_entries, lookup, AnnotatedUnit, VocabIndex};
    pub use crate::models::{
        ApplySummary, BasicForm, FuriganaAction, FuriganaEntry, LexicalUnit, NewVocab,
        ReconcileAction, ReconcileEntry, ReconcileParams, ReconcileReport, ReconcileSummary,
        SentenceWindow, VocabEntry, VocabUpdate, LINE_BREAK, UNRESOLVED,
    };
    pub use crate::normalize::{is_hiragana_folded, katakana_to_hiragana, normalize_for_search};
    pub use crate::output::{
        format_furigana_entry, format_plan_entry, format_unit, print_furigana_summary, print_plan,
        print_summary, print_units, print_vocab, write_furigana_csv, write_furigana_csv_file,
        write_furigana_plan, write_furigana_plan_file, write_json, write_json_file, write_plan,
        write_plan_csv, write_plan_csv_file, write_plan_file, OutputError, PlanFormat,
    };
    pub use crate::reconcile::{apply_furigana_plan, apply_plan, reconcile, reconcile_furigana};
    pub use crate::search::{matches_query, search_vocab};
    pub use crate::sentence::{
        derive_title, extract_sentence, render, sentence_window, SentenceError,
        SENTENCE_TERMINATORS,
    };
    pub use crate::store::{SqliteVocabStore, StoreError, VocabStore};
    pub use crate::tokenize::{line_break_count, reconstruct, tokenize};
}

// Re-export commonly used types at the crate root
pub use analyzer::{Analyzer, AnalyzerError};
pub use models::{LexicalUnit, ReconcileParams, ReconcileReport, VocabEntry};
