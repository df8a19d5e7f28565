//! Matching lexical units against stored vocabulary.
//!
//! A unit matches an entry when its dictionary form equals the entry's
//! `word` exactly: no case or kana folding. Line breaks and units whose
//! dictionary form is unresolved never match. When several entries share a
//! word, the first one wins.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{LexicalUnit, VocabEntry};

/// The form a unit is matched by, if it can match at all.
fn match_key(unit: &LexicalUnit) -> Option<&str> {
    if unit.is_line_break() {
        return None;
    }
    unit.basic_form.known()
}

/// Find the stored entry for a unit.
pub fn lookup<'a>(unit: &LexicalUnit, vocab: &'a [VocabEntry]) -> Option<&'a VocabEntry> {
    let key = match_key(unit)?;
    vocab.iter().find(|entry| entry.word == key)
}

pub fn is_known(unit: &LexicalUnit, vocab: &[VocabEntry]) -> bool {
    lookup(unit, vocab).is_some()
}

/// Word-keyed index over a vocabulary snapshot, for matching long texts.
#[derive(Debug, Clone, Default)]
pub struct VocabIndex<'a> {
    by_word: HashMap<&'a str, &'a VocabEntry>,
}

impl<'a> VocabIndex<'a> {
    pub fn new(vocab: &'a [VocabEntry]) -> Self {
        let mut by_word = HashMap::with_capacity(vocab.len());
        for entry in vocab {
            by_word.entry(entry.word.as_str()).or_insert(entry);
        }
        VocabIndex { by_word }
    }

    pub fn lookup(&self, unit: &LexicalUnit) -> Option<&'a VocabEntry> {
        let key = match_key(unit)?;
        self.by_word.get(key).copied()
    }

    pub fn is_known(&self, unit: &LexicalUnit) -> bool {
        self.lookup(unit).is_some()
    }

    /// Number of distinct words.
    pub fn len(&self) -> usize {
        self.by_word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_word.is_empty()
    }
}

/// A unit together with its matching entry.
#[derive(Debug, Clone, Serialize)]
pub struct AnnotatedUnit<'a> {
    pub index: usize,
    #[serde(flatten)]
    pub unit: &'a LexicalUnit,
    pub known: bool,
    pub entry: Option<&'a VocabEntry>,
}

/// Mark every unit of a sequence as known or not.
pub fn annotate<'a>(units: &'a [LexicalUnit], vocab: &'a [VocabEntry]) -> Vec<AnnotatedUnit<'a>> {
    let index = VocabIndex::new(vocab);
    units
        .iter()
        .enumerate()
        .map(|(i, unit)| {
            let entry = index.lookup(unit);
            AnnotatedUnit {
                index: i,
                unit,
                known: entry.is_some(),
                entry,
            }
        })
        .collect()
}

/// Distinct known entries in order of first appearance.
pub fn known_entries<'a>(units: &[LexicalUnit], vocab: &'a [VocabEntry]) -> Vec<&'a VocabEntry> {
    let index = VocabIndex::new(vocab);
    let mut seen = std::collections::HashSet::new();
    units
        .iter()
        .filter_map(|unit| index.lookup(unit))
        .filter(|entry| seen.insert(entry.id))
        .collect()
}
