//! Line-aware tokenization.
//!
//! The input is split on `\n` and each line is analyzed on its own. The
//! analyzer discards formatting, so the whitespace in front of every unit is
//! recovered by locating its surface form in the line, searching forward
//! from a cursor that sits just past the previous unit. Newlines become
//! explicit line-break units.
//!
//! The cursor search is best-effort: a surface that cannot be found at or
//! after the cursor gets no whitespace and leaves the cursor where it was.
//! Whatever the line still holds past the cursor after its last unit is
//! carried by the line-break marker that follows it.

use tracing::warn;

use crate::analyzer::{Analyzer, AnalyzerError};
use crate::models::{LexicalUnit, LINE_BREAK};

/// Tokenize multi-line text into a flat unit sequence.
///
/// The engine is loaded before any line is looked at, so an unavailable
/// analyzer fails the call even for empty or blank input. Any analyzer
/// error aborts the whole call; no partial sequence is returned.
pub fn tokenize<A: Analyzer + ?Sized>(
    analyzer: &A,
    text: &str,
) -> Result<Vec<LexicalUnit>, AnalyzerError> {
    analyzer.warm_up()?;
    let mut units = Vec::new();

    let lines: Vec<&str> = text.split('\n').collect();
    let last_line = lines.len() - 1;

    for (line_index, line) in lines.iter().enumerate() {
        // Blank lines are not analyzed; they only contribute their marker
        let residue = if line.trim().is_empty() {
            line
        } else {
            tokenize_line(analyzer, line, &mut units)?
        };

        if line_index < last_line {
            units.push(LexicalUnit::line_break(residue));
        }
    }

    Ok(units)
}

/// Analyze one line, appending its units. Returns the unconsumed tail.
fn tokenize_line<'a, A: Analyzer + ?Sized>(
    analyzer: &A,
    line: &'a str,
    units: &mut Vec<LexicalUnit>,
) -> Result<&'a str, AnalyzerError> {
    let tokens = analyzer.analyze(line)?;
    let mut cursor = 0usize;

    for token in tokens {
        let whitespace_before = match line[cursor..].find(token.surface.as_str()) {
            Some(offset) => {
                let start = cursor + offset;
                let whitespace = line[cursor..start].to_string();
                cursor = start + token.surface.len();
                whitespace
            }
            None => {
                warn!(
                    surface = %token.surface,
                    cursor,
                    "Surface not found after cursor; whitespace not recovered"
                );
                String::new()
            }
        };

        units.push(token.into_unit(whitespace_before));
    }

    Ok(&line[cursor..])
}

/// Rebuild the text a unit sequence was produced from.
///
/// Exact for every input except one: whitespace trailing the last line has
/// no line-break marker to carry it, so `"私は "` comes back as `"私は"`.
/// Trailing whitespace on any earlier line survives.
pub fn reconstruct(units: &[LexicalUnit]) -> String {
    let mut text = String::new();
    for unit in units {
        text.push_str(&unit.whitespace_before);
        if unit.is_line_break() {
            text.push_str(LINE_BREAK);
        } else {
            text.push_str(&unit.surface);
        }
    }
    text
}

pub fn line_break_count(units: &[LexicalUnit]) -> usize {
    units.iter().filter(|u| u.is_line_break()).count()
}
