//! Reconciliation of stored vocabulary onto dictionary forms.
//!
//! Entries saved straight from a text may hold an inflected surface form
//! ("食べた") instead of the dictionary form ("食べる"), which keeps them
//! from ever matching later texts. [`reconcile`] re-analyzes every entry and
//! produces a plan; nothing is written until [`apply_plan`] runs.
//!
//! Rewrites that could lose information are never proposed: compounds that
//! split into several units, words with no resolvable dictionary form, and
//! rewrites that would collide with another entry are all skipped for
//! review instead.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::analyzer::{AnalyzedToken, Analyzer, AnalyzerError};
use crate::models::{
    ApplySummary, BasicForm, FuriganaAction, FuriganaEntry, ReconcileAction, ReconcileEntry,
    ReconcileParams, ReconcileReport, ReconcileSummary, VocabEntry, VocabUpdate,
};
use crate::normalize::{is_hiragana_folded, katakana_to_hiragana};
use crate::store::{StoreError, VocabStore};

/// Ids of every entry holding a given word, taken once before the scan.
type WordIndex<'a> = HashMap<&'a str, Vec<i64>>;

fn build_word_index(vocab: &[VocabEntry]) -> WordIndex<'_> {
    let mut index: WordIndex<'_> = HashMap::new();
    for entry in vocab {
        index.entry(entry.word.as_str()).or_default().push(entry.id);
    }
    index
}

/// Build a dictionary-form plan for a full vocabulary snapshot.
///
/// The engine is loaded up front, so an unavailable analyzer fails the
/// whole batch. After that, a failed call only degrades its own entry to
/// `SkipUnknown`, with the failure recorded on the entry.
pub fn reconcile<A: Analyzer + Sync + ?Sized>(
    analyzer: &A,
    all_vocab: &[VocabEntry],
    params: &ReconcileParams,
    show_progress: bool,
) -> Result<ReconcileReport, AnalyzerError> {
    analyzer.warm_up()?;
    info!(entries = all_vocab.len(), parallel = params.parallel, "Reconciling vocabulary");

    let words = build_word_index(all_vocab);

    let progress = if show_progress {
        let pb = ProgressBar::new(all_vocab.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    } else {
        None
    };

    let classify = |entry: &VocabEntry| {
        let result = classify_entry(analyzer, entry, &words, params);
        if let Some(ref pb) = progress {
            pb.inc(1);
        }
        result
    };

    let classified: Vec<ReconcileEntry> = if params.parallel {
        all_vocab
            .par_iter()
            .map(classify)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        all_vocab.iter().map(classify).collect::<Result<Vec<_>, _>>()?
    };

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }

    let entries = resolve_planned_collisions(classified);
    let summary = ReconcileSummary::from_entries(&entries);

    info!(
        updates = summary.updates,
        skipped = summary.total - summary.updates,
        failed_calls = summary.failed_calls,
        "Reconciliation plan ready"
    );

    Ok(ReconcileReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        parameters: params.clone(),
        summary,
        entries,
    })
}

/// Decide the action for a single entry.
fn classify_entry<A: Analyzer + ?Sized>(
    analyzer: &A,
    entry: &VocabEntry,
    words: &WordIndex<'_>,
    params: &ReconcileParams,
) -> Result<ReconcileEntry, AnalyzerError> {
    let decided = |action: ReconcileAction| ReconcileEntry {
        entry: entry.clone(),
        action,
        error: None,
    };

    let tokens = match analyzer.analyze(&entry.word) {
        Ok(tokens) => tokens,
        Err(AnalyzerError::CallFailed(message)) => {
            warn!(id = entry.id, word = %entry.word, %message, "Analyzer call failed, skipping");
            return Ok(ReconcileEntry {
                error: Some(message),
                ..decided(ReconcileAction::SkipUnknown)
            });
        }
        Err(unavailable) => return Err(unavailable),
    };

    let token = match tokens.as_slice() {
        [] => {
            debug!(id = entry.id, word = %entry.word, "No units, skipping");
            return Ok(decided(ReconcileAction::SkipUnknown));
        }
        [token] => token,
        many => {
            debug!(id = entry.id, word = %entry.word, units = many.len(), "Compound word, skipping");
            let parts = many.iter().map(|t| t.surface.clone()).collect();
            return Ok(decided(ReconcileAction::SkipCompound { parts }));
        }
    };

    let canonical = match BasicForm::from(token.basic_form.as_str()) {
        BasicForm::Unknown => {
            debug!(id = entry.id, word = %entry.word, "Unknown to the analyzer, skipping");
            return Ok(decided(ReconcileAction::SkipUnknown));
        }
        BasicForm::Known(form) if form == entry.word => {
            return Ok(decided(ReconcileAction::SkipAlreadyCanonical));
        }
        BasicForm::Known(form) => form,
    };

    let furigana = canonical_reading(analyzer, entry, &canonical, token, params)?;

    let duplicate = words
        .get(canonical.as_str())
        .and_then(|ids| ids.iter().copied().find(|&id| id != entry.id));
    if let Some(duplicate_id) = duplicate {
        debug!(
            id = entry.id,
            word = %entry.word,
            canonical = %canonical,
            duplicate_id,
            "Dictionary form already stored, skipping"
        );
        return Ok(decided(ReconcileAction::SkipDuplicate {
            word: canonical,
            duplicate_id,
        }));
    }

    debug!(id = entry.id, word = %entry.word, canonical = %canonical, furigana = %furigana, "Update");
    Ok(decided(ReconcileAction::Update {
        word: canonical,
        furigana,
    }))
}

/// Reading for the dictionary form itself.
///
/// The inflected token's reading belongs to the inflected form ("タベタ"),
/// so the dictionary form is analyzed on its own. Falls back to the first
/// token's reading, then to the stored furigana.
fn canonical_reading<A: Analyzer + ?Sized>(
    analyzer: &A,
    entry: &VocabEntry,
    canonical: &str,
    token: &AnalyzedToken,
    params: &ReconcileParams,
) -> Result<String, AnalyzerError> {
    let second_pass = match analyzer.analyze(canonical) {
        Ok(tokens) => tokens,
        Err(AnalyzerError::CallFailed(message)) => {
            warn!(id = entry.id, canonical, %message, "Reading lookup failed, using first reading");
            Vec::new()
        }
        Err(unavailable) => return Err(unavailable),
    };

    let reading = second_pass
        .first()
        .and_then(AnalyzedToken::resolved_reading)
        .or_else(|| token.resolved_reading());

    let furigana = match reading {
        Some(reading) if params.hiragana_furigana => katakana_to_hiragana(reading),
        Some(reading) => reading.to_string(),
        None => entry.furigana.clone().unwrap_or_default(),
    };
    Ok(furigana)
}

/// Turn later updates that target a word an earlier update already claimed
/// into duplicates, so applying the plan never creates two entries with
/// the same word.
fn resolve_planned_collisions(mut entries: Vec<ReconcileEntry>) -> Vec<ReconcileEntry> {
    let mut claimed: HashMap<String, i64> = HashMap::new();

    for planned in entries.iter_mut() {
        let word = match &planned.action {
            ReconcileAction::Update { word, .. } => word.clone(),
            _ => continue,
        };

        match claimed.get(&word) {
            Some(&duplicate_id) => {
                debug!(
                    id = planned.entry.id,
                    canonical = %word,
                    duplicate_id,
                    "Dictionary form claimed by an earlier update, skipping"
                );
                planned.action = ReconcileAction::SkipDuplicate { word, duplicate_id };
            }
            None => {
                claimed.insert(word, planned.entry.id);
            }
        }
    }

    entries
}

/// Build a plan converting katakana furigana to hiragana.
pub fn reconcile_furigana(all_vocab: &[VocabEntry]) -> Vec<FuriganaEntry> {
    all_vocab
        .iter()
        .map(|entry| {
            let action = match entry.furigana.as_deref() {
                None | Some("") => FuriganaAction::SkipMissing,
                Some(furigana) if is_hiragana_folded(furigana) => {
                    FuriganaAction::SkipAlreadyHiragana
                }
                Some(furigana) => FuriganaAction::Update {
                    furigana: katakana_to_hiragana(furigana),
                },
            };
            FuriganaEntry {
                entry: entry.clone(),
                action,
            }
        })
        .collect()
}

/// Persist every update in a dictionary-form plan.
///
/// Updates write absolute values, so applying the same plan twice leaves
/// the store as the first application did.
pub fn apply_plan<S: VocabStore + ?Sized>(
    store: &mut S,
    report: &ReconcileReport,
) -> Result<ApplySummary, StoreError> {
    let mut summary = ApplySummary::default();

    for planned in &report.entries {
        match &planned.action {
            ReconcileAction::Update { word, furigana } => {
                let update = VocabUpdate {
                    word: Some(word.clone()),
                    furigana: Some(furigana.clone()),
                    ..Default::default()
                };
                store.update_vocab(planned.entry.id, &update)?;
                summary.applied += 1;
            }
            _ => summary.skipped += 1,
        }
    }

    info!(applied = summary.applied, skipped = summary.skipped, "Plan applied");
    Ok(summary)
}

/// Persist every update in a furigana plan.
pub fn apply_furigana_plan<S: VocabStore + ?Sized>(
    store: &mut S,
    plan: &[FuriganaEntry],
) -> Result<ApplySummary, StoreError> {
    let mut summary = ApplySummary::default();

    for planned in plan {
        match &planned.action {
            FuriganaAction::Update { furigana } => {
                let update = VocabUpdate {
                    furigana: Some(furigana.clone()),
                    ..Default::default()
                };
                store.update_vocab(planned.entry.id, &update)?;
                summary.applied += 1;
            }
            _ => summary.skipped += 1,
        }
    }

    info!(applied = summary.applied, skipped = summary.skipped, "Furigana plan applied");
    Ok(summary)
}
