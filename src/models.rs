//! Data structures for line-aware tokenization and vocabulary reconciliation.

use serde::{Deserialize, Serialize};

/// Surface form and basic form of a synthetic line-break unit.
pub const LINE_BREAK: &str = "\n";

/// Sentinel the analyzer uses for "not applicable / unresolved".
pub const UNRESOLVED: &str = "*";

/// Dictionary form of a lexical unit.
///
/// The analyzer reports an unresolvable dictionary form as `"*"`; that
/// sentinel is turned into [`BasicForm::Unknown`] as soon as a token enters
/// the crate and only turned back into `"*"` on serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BasicForm {
    /// Resolved dictionary form (the marker itself for line breaks)
    Known(String),
    /// The analyzer could not resolve a dictionary form
    Unknown,
}

impl BasicForm {
    /// The form as the analyzer spells it, `"*"` for `Unknown`.
    pub fn as_str(&self) -> &str {
        match self {
            BasicForm::Known(form) => form,
            BasicForm::Unknown => UNRESOLVED,
        }
    }

    /// The resolved form, if any.
    pub fn known(&self) -> Option<&str> {
        match self {
            BasicForm::Known(form) => Some(form),
            BasicForm::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, BasicForm::Unknown)
    }
}

impl From<String> for BasicForm {
    fn from(raw: String) -> Self {
        if raw == UNRESOLVED {
            BasicForm::Unknown
        } else {
            BasicForm::Known(raw)
        }
    }
}

impl From<&str> for BasicForm {
    fn from(raw: &str) -> Self {
        BasicForm::from(raw.to_string())
    }
}

impl From<BasicForm> for String {
    fn from(form: BasicForm) -> Self {
        match form {
            BasicForm::Known(form) => form,
            BasicForm::Unknown => UNRESOLVED.to_string(),
        }
    }
}

/// One analyzed token, or a synthetic line-break marker.
///
/// Concatenating `whitespace_before + surface` over a tokenized sequence
/// reproduces the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalUnit {
    #[serde(rename = "surface_form")]
    pub surface: String,
    pub pos: String,
    pub pos_detail_1: String,
    pub pos_detail_2: String,
    pub pos_detail_3: String,
    pub conjugated_type: String,
    pub conjugated_form: String,
    pub basic_form: BasicForm,
    pub reading: String,       // Katakana, empty for markers
    pub pronunciation: String,
    #[serde(default)]
    pub whitespace_before: String,
}

impl LexicalUnit {
    /// Build a line-break marker.
    ///
    /// `residue` is whatever was left on the line after the last matched
    /// unit (trailing spaces, or the whole of a whitespace-only line).
    pub fn line_break(residue: &str) -> Self {
        LexicalUnit {
            surface: LINE_BREAK.to_string(),
            pos: String::new(),
            pos_detail_1: String::new(),
            pos_detail_2: String::new(),
            pos_detail_3: String::new(),
            conjugated_type: String::new(),
            conjugated_form: String::new(),
            basic_form: BasicForm::Known(LINE_BREAK.to_string()),
            reading: String::new(),
            pronunciation: String::new(),
            whitespace_before: residue.to_string(),
        }
    }

    pub fn is_line_break(&self) -> bool {
        self.surface == LINE_BREAK
    }
}

/// A stored vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    pub id: i64,
    pub word: String,     // Expected to be a dictionary form
    #[serde(default)]
    pub furigana: Option<String>,  // Expected hiragana
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields for a vocabulary entry that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVocab {
    pub word: String,
    #[serde(default)]
    pub furigana: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a stored entry; `None` leaves the column as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabUpdate {
    pub word: Option<String>,
    pub furigana: Option<String>,
    pub meaning: Option<String>,
    pub notes: Option<String>,
}

/// Sentence context around a unit: units `[start, end)` and their text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceWindow {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

// ============================================================================
// Reconciliation plans
// ============================================================================

/// Reconciliation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileParams {
    /// Classify entries on the rayon pool instead of one after another
    pub parallel: bool,
    /// Store proposed furigana in hiragana rather than the analyzer's katakana
    pub hiragana_furigana: bool,
}

impl Default for ReconcileParams {
    fn default() -> Self {
        Self {
            parallel: true,
            hiragana_furigana: true,
        }
    }
}

/// What the dictionary-form reconciler proposes for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReconcileAction {
    /// Rewrite the entry to its dictionary form
    Update { word: String, furigana: String },
    /// Nothing to analyze, or the analyzer could not resolve a dictionary form
    SkipUnknown,
    /// The word splits into several units; rewriting would drop morphemes
    SkipCompound { parts: Vec<String> },
    /// Another entry already holds the dictionary form
    SkipDuplicate { word: String, duplicate_id: i64 },
    SkipAlreadyCanonical,
}

impl ReconcileAction {
    pub fn is_update(&self) -> bool {
        matches!(self, ReconcileAction::Update { .. })
    }

    /// Short label used in CSV and console output.
    pub fn label(&self) -> &'static str {
        match self {
            ReconcileAction::Update { .. } => "update",
            ReconcileAction::SkipUnknown => "skip_unknown",
            ReconcileAction::SkipCompound { .. } => "skip_compound",
            ReconcileAction::SkipDuplicate { .. } => "skip_duplicate",
            ReconcileAction::SkipAlreadyCanonical => "skip_already_canonical",
        }
    }
}

/// One entry of a reconciliation plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileEntry {
    pub entry: VocabEntry,
    #[serde(flatten)]
    pub action: ReconcileAction,
    /// Analyzer failure that degraded this entry to `SkipUnknown`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub total: usize,
    pub updates: usize,
    pub skipped_unknown: usize,
    pub skipped_compound: usize,
    pub skipped_duplicate: usize,
    pub already_canonical: usize,
    pub failed_calls: usize,
}

impl ReconcileSummary {
    pub fn from_entries(entries: &[ReconcileEntry]) -> Self {
        let mut summary = ReconcileSummary {
            total: entries.len(),
            ..Default::default()
        };

        for entry in entries {
            match entry.action {
                ReconcileAction::Update { .. } => summary.updates += 1,
                ReconcileAction::SkipUnknown => summary.skipped_unknown += 1,
                ReconcileAction::SkipCompound { .. } => summary.skipped_compound += 1,
                ReconcileAction::SkipDuplicate { .. } => summary.skipped_duplicate += 1,
                ReconcileAction::SkipAlreadyCanonical => summary.already_canonical += 1,
            }
            if entry.error.is_some() {
                summary.failed_calls += 1;
            }
        }

        summary
    }
}

/// Full reconciliation plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub version: String,
    pub parameters: ReconcileParams,
    pub summary: ReconcileSummary,
    pub entries: Vec<ReconcileEntry>,
}

impl ReconcileReport {
    /// Entries whose action is an update, in plan order.
    pub fn updates(&self) -> impl Iterator<Item = &ReconcileEntry> {
        self.entries.iter().filter(|e| e.action.is_update())
    }
}

/// What the furigana reconciler proposes for one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FuriganaAction {
    Update { furigana: String },
    SkipMissing,
    SkipAlreadyHiragana,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuriganaEntry {
    pub entry: VocabEntry,
    #[serde(flatten)]
    pub action: FuriganaAction,
}

/// Outcome of persisting a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub applied: usize,
    pub skipped: usize,
}
