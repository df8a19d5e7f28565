//! Japanese script normalization for search and equality.
//!
//! Both functions are total and idempotent. They are meant for comparison
//! only; stored data is never rewritten through `normalize_for_search`.

/// Katakana block, inclusive
const KATAKANA_FIRST: u32 = 0x30A0;
const KATAKANA_LAST: u32 = 0x30FF;

/// Passed through unchanged by kana folding
const MIDDLE_DOT: u32 = 0x30FB;
const PROLONGED_SOUND_MARK: u32 = 0x30FC;

/// Katakana code point minus this gives the matching hiragana
const KANA_OFFSET: u32 = 0x60;

/// Full-width ASCII variant minus this gives the half-width character
const FULLWIDTH_OFFSET: u32 = 0xFEE0;

fn fold_katakana(c: char) -> char {
    let code = c as u32;
    if (KATAKANA_FIRST..=KATAKANA_LAST).contains(&code)
        && code != MIDDLE_DOT
        && code != PROLONGED_SOUND_MARK
    {
        char::from_u32(code - KANA_OFFSET).unwrap_or(c)
    } else {
        c
    }
}

fn fold_fullwidth_alphanumeric(c: char) -> char {
    match c {
        'Ａ'..='Ｚ' | 'ａ'..='ｚ' | '０'..='９' => {
            char::from_u32(c as u32 - FULLWIDTH_OFFSET).unwrap_or(c)
        }
        _ => c,
    }
}

/// Convert katakana to hiragana, keeping `ー` and `・` as they are.
pub fn katakana_to_hiragana(s: &str) -> String {
    s.chars().map(fold_katakana).collect()
}

/// Fold a string for search matching: full-width letters and digits to
/// half-width, ASCII to lowercase, katakana to hiragana.
pub fn normalize_for_search(s: &str) -> String {
    s.chars()
        .map(fold_fullwidth_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .map(fold_katakana)
        .collect()
}

/// True when kana folding would change nothing.
pub fn is_hiragana_folded(s: &str) -> bool {
    s.chars().all(|c| fold_katakana(c) == c)
}
