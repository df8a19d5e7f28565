//! Sentence context around a selected unit.

use thiserror::Error;

use crate::models::{LexicalUnit, SentenceWindow};

/// Punctuation that ends a sentence. Line breaks end one too.
pub const SENTENCE_TERMINATORS: [&str; 7] = ["。", "！", "？", ".", ",", "?", "!"];

/// Longest title derived from text content, in characters
const TITLE_MAX_CHARS: usize = 50;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SentenceError {
    #[error("Index {index} out of range for {len} units")]
    InvalidIndex { index: usize, len: usize },
    #[error("Index {0} points at a line break")]
    LineBreakIndex(usize),
}

fn is_terminator(unit: &LexicalUnit) -> bool {
    SENTENCE_TERMINATORS.contains(&unit.surface.as_str())
}

fn is_boundary(unit: &LexicalUnit) -> bool {
    unit.is_line_break() || is_terminator(unit)
}

/// Find the sentence containing `units[index]`.
///
/// The window extends left up to the previous boundary and right up to the
/// next one; a terminating punctuation mark is part of the sentence, a line
/// break is not.
pub fn sentence_window(
    units: &[LexicalUnit],
    index: usize,
) -> Result<SentenceWindow, SentenceError> {
    let unit = units.get(index).ok_or(SentenceError::InvalidIndex {
        index,
        len: units.len(),
    })?;
    if unit.is_line_break() {
        return Err(SentenceError::LineBreakIndex(index));
    }

    let mut start = index;
    while start > 0 && !is_boundary(&units[start - 1]) {
        start -= 1;
    }

    let mut end = index;
    while end < units.len() && !is_boundary(&units[end]) {
        end += 1;
    }
    if end < units.len() && is_terminator(&units[end]) {
        end += 1;
    }

    Ok(SentenceWindow {
        start,
        end,
        text: render(&units[start..end]),
    })
}

/// The rendered sentence containing `units[index]`, original spacing kept.
pub fn extract_sentence(units: &[LexicalUnit], index: usize) -> Result<String, SentenceError> {
    sentence_window(units, index).map(|window| window.text)
}

/// Concatenate `whitespace_before + surface`, skipping line breaks.
pub fn render(units: &[LexicalUnit]) -> String {
    units
        .iter()
        .filter(|u| !u.is_line_break())
        .map(|u| format!("{}{}", u.whitespace_before, u.surface))
        .collect()
}

/// Default title for a text: its content up to the first `。` or newline.
pub fn derive_title(text: &str) -> Option<String> {
    let first = text.split(['。', '\n']).next().unwrap_or_default();
    let title: String = first.chars().take(TITLE_MAX_CHARS).collect();
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}
