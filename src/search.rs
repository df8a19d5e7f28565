//! Vocabulary search with script-insensitive matching.

use crate::models::VocabEntry;
use crate::normalize::normalize_for_search;

/// True when any text field of `entry` contains the already-normalized query.
pub fn matches_query(entry: &VocabEntry, normalized_query: &str) -> bool {
    let fields = [
        Some(entry.word.as_str()),
        entry.furigana.as_deref(),
        entry.meaning.as_deref(),
        entry.notes.as_deref(),
    ];

    fields
        .into_iter()
        .flatten()
        .any(|field| normalize_for_search(field).contains(normalized_query))
}

/// Entries matching `query` in word, furigana, meaning or notes.
///
/// A blank query matches everything. Order of `vocab` is kept.
pub fn search_vocab<'a>(query: &str, vocab: &'a [VocabEntry]) -> Vec<&'a VocabEntry> {
    if query.trim().is_empty() {
        return vocab.iter().collect();
    }

    let normalized = normalize_for_search(query);
    vocab
        .iter()
        .filter(|entry| matches_query(entry, &normalized))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<VocabEntry> {
        vec![
            VocabEntry {
                id: 1,
                word: "勉強".to_string(),
                furigana: Some("べんきょう".to_string()),
                meaning: Some("Study".to_string()),
                notes: Some("Common verb for studying".to_string()),
            },
            VocabEntry {
                id: 2,
                word: "コンピューター".to_string(),
                furigana: None,
                meaning: Some("computer".to_string()),
                notes: None,
            },
            VocabEntry {
                id: 3,
                word: "毎日".to_string(),
                furigana: Some("まいにち".to_string()),
                meaning: Some("every day".to_string()),
                notes: Some("Time expression".to_string()),
            },
        ]
    }

    fn ids(found: &[&VocabEntry]) -> Vec<i64> {
        found.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_blank_query_returns_all() {
        let vocab = vocab();
        assert_eq!(ids(&search_vocab("", &vocab)), vec![1, 2, 3]);
        assert_eq!(ids(&search_vocab("   ", &vocab)), vec![1, 2, 3]);
    }

    #[test]
    fn test_katakana_query_matches_hiragana_furigana() {
        let vocab = vocab();
        assert_eq!(ids(&search_vocab("ベンキョウ", &vocab)), vec![1]);
    }

    #[test]
    fn test_hiragana_query_matches_katakana_word() {
        let vocab = vocab();
        assert_eq!(ids(&search_vocab("こんぴゅー", &vocab)), vec![2]);
    }

    #[test]
    fn test_fullwidth_and_case_insensitive() {
        let vocab = vocab();
        assert_eq!(ids(&search_vocab("ＳＴＵＤＹ", &vocab)), vec![1]);
        assert_eq!(ids(&search_vocab("TIME", &vocab)), vec![3]);
    }

    #[test]
    fn test_no_match() {
        let vocab = vocab();
        assert!(search_vocab("犬", &vocab).is_empty());
    }
}
