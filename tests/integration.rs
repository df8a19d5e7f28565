//! Integration tests for yomeru-core.
//!
//! These tests run text through tokenization, sentence extraction and
//! vocabulary matching, and vocabulary through reconciliation against a
//! real SQLite store.

use std::sync::Arc;

use yomeru_core::analyzer::{Adapter, Analyzer, AnalyzerError, LexiconAnalyzer};
use yomeru_core::matcher::{annotate, known_entries, VocabIndex};
use yomeru_core::models::{
    NewVocab, ReconcileAction, ReconcileParams, VocabEntry, LINE_BREAK,
};
use yomeru_core::reconcile::{apply_furigana_plan, apply_plan, reconcile, reconcile_furigana};
use yomeru_core::search::search_vocab;
use yomeru_core::sentence::{extract_sentence, sentence_window};
use yomeru_core::store::{SqliteVocabStore, VocabStore};
use yomeru_core::tokenize::{line_break_count, reconstruct, tokenize};

/// Small IPADIC-style lexicon covering the test texts.
fn lexicon() -> LexiconAnalyzer {
    LexiconAnalyzer::new()
        .with_entry("私", "名詞,代名詞,一般,*,*,*,私,ワタシ,ワタシ")
        .with_entry("は", "助詞,係助詞,*,*,*,*,は,ハ,ワ")
        .with_entry("学生", "名詞,一般,*,*,*,*,学生,ガクセイ,ガクセー")
        .with_entry("です", "助動詞,*,*,*,特殊・デス,基本形,です,デス,デス")
        .with_entry("。", "記号,句点,*,*,*,*,。,。,。")
        .with_entry("昨日", "名詞,副詞可能,*,*,*,*,昨日,キノウ,キノー")
        .with_entry("寿司", "名詞,一般,*,*,*,*,寿司,スシ,スシ")
        .with_entry("を", "助詞,格助詞,一般,*,*,*,を,ヲ,ヲ")
        .with_entry("食べ", "動詞,自立,*,*,一段,連用形,食べる,タベ,タベ")
        .with_entry("食べた", "動詞,自立,*,*,一段,連用タ接続,食べる,タベタ,タベタ")
        .with_entry("食べる", "動詞,自立,*,*,一段,基本形,食べる,タベル,タベル")
        .with_entry("た", "助動詞,*,*,*,特殊・タ,基本形,た,タ,タ")
        .with_entry("飲んだ", "動詞,自立,*,*,五段・マ行,連用タ接続,飲む,ノンダ,ノンダ")
        .with_entry("飲む", "動詞,自立,*,*,五段・マ行,基本形,飲む,ノム,ノム")
        .with_entry("年", "名詞,接尾,助数詞,*,*,*,年,ネン,ネン")
        .with_entry("生", "名詞,接尾,一般,*,*,*,生,セイ,セイ")
}

fn new_vocab(word: &str, furigana: Option<&str>, meaning: &str) -> NewVocab {
    NewVocab {
        word: word.to_string(),
        furigana: furigana.map(str::to_string),
        meaning: Some(meaning.to_string()),
        notes: None,
    }
}

fn seeded_store() -> SqliteVocabStore {
    let mut store = SqliteVocabStore::open_in_memory().unwrap();
    store
        .insert_all(&[
            new_vocab("食べた", Some("タベタ"), "to eat"),
            new_vocab("学生", Some("がくせい"), "student"),
            new_vocab("年生", None, "n-th year student"),
            new_vocab("飲んだ", None, "to drink"),
            new_vocab("飲む", Some("のむ"), "to drink"),
        ])
        .unwrap();
    store
}

#[test]
fn test_reading_flow() {
    let analyzer = lexicon();
    let text = "私は学生です。昨日 寿司を食べた。\n  学生です。";
    let units = tokenize(&analyzer, text).unwrap();

    assert_eq!(reconstruct(&units), text);
    assert_eq!(line_break_count(&units), 1);

    // Clicking 寿司 gives the sentence it belongs to, spacing intact
    let sushi = units.iter().position(|u| u.surface == "寿司").unwrap();
    assert_eq!(extract_sentence(&units, sushi).unwrap(), "昨日 寿司を食べた。");

    // The second line is its own sentence; the indentation stays with its first unit
    let last = units.len() - 1;
    let window = sentence_window(&units, last).unwrap();
    assert_eq!(units[window.start - 1].surface, LINE_BREAK);
    assert_eq!(window.text, "  学生です。");
}

#[test]
fn test_known_words_match_on_dictionary_form() {
    let analyzer = lexicon();
    let vocab = vec![
        VocabEntry {
            id: 1,
            word: "食べる".to_string(),
            furigana: Some("たべる".to_string()),
            meaning: Some("to eat".to_string()),
            notes: None,
        },
        VocabEntry {
            id: 2,
            word: "学生".to_string(),
            furigana: None,
            meaning: Some("student".to_string()),
            notes: None,
        },
    ];

    let units = tokenize(&analyzer, "学生は寿司を食べた。\n私は学生です。").unwrap();
    let annotated = annotate(&units, &vocab);

    let known: Vec<&str> = annotated
        .iter()
        .filter(|a| a.known)
        .map(|a| a.unit.surface.as_str())
        .collect();
    assert_eq!(known, vec!["学生", "食べた", "学生"]);

    let ids: Vec<i64> = known_entries(&units, &vocab).iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![2, 1]);

    let index = VocabIndex::new(&vocab);
    assert!(units.iter().filter(|u| u.is_line_break()).all(|u| !index.is_known(u)));
}

#[test]
fn test_reconcile_apply_converges() {
    let mut store = seeded_store();
    let analyzer = lexicon();
    let params = ReconcileParams::default();

    let report = reconcile(&analyzer, &store.list_vocab().unwrap(), &params, false).unwrap();
    let actions: Vec<&str> = report.entries.iter().map(|e| e.action.label()).collect();
    assert_eq!(
        actions,
        vec![
            "update",
            "skip_already_canonical",
            "skip_compound",
            "skip_duplicate",
            "skip_already_canonical",
        ]
    );
    assert_eq!(
        report.entries[3].action,
        ReconcileAction::SkipDuplicate {
            word: "飲む".to_string(),
            duplicate_id: 5,
        }
    );

    let applied = apply_plan(&mut store, &report).unwrap();
    assert_eq!(applied.applied, 1);

    let eaten = store.find_vocab_by_word("食べる").unwrap().unwrap();
    assert_eq!(eaten.furigana.as_deref(), Some("たべる"));
    assert_eq!(eaten.meaning.as_deref(), Some("to eat"));

    // A second run finds nothing left to rewrite
    let again = reconcile(&analyzer, &store.list_vocab().unwrap(), &params, false).unwrap();
    assert_eq!(again.summary.updates, 0);
    assert_eq!(again.summary.skipped_compound, 1);
    assert_eq!(again.summary.skipped_duplicate, 1);
}

#[test]
fn test_reconcile_through_shared_adapter() {
    let adapter = Arc::new(Adapter::new(|| Ok(lexicon())));
    let vocab = seeded_store().list_vocab().unwrap();

    let report = reconcile(&adapter, &vocab, &ReconcileParams::default(), false).unwrap();
    assert!(adapter.is_loaded());
    assert_eq!(report.summary.total, vocab.len());
    assert_eq!(report.summary.updates, 1);

    // The same adapter keeps serving tokenization
    let units = tokenize(&adapter, "学生です").unwrap();
    assert_eq!(units.len(), 2);
}

#[test]
fn test_unavailable_analyzer_leaves_store_untouched() {
    let adapter: Adapter<LexiconAnalyzer> =
        Adapter::new(|| Err(AnalyzerError::Unavailable("no dictionary".to_string())));
    let store = seeded_store();
    let before = store.list_vocab().unwrap();

    let result = reconcile(&adapter, &before, &ReconcileParams::default(), false);
    assert!(matches!(result, Err(AnalyzerError::Unavailable(_))));
    assert!(tokenize(&adapter, "学生").is_err());
    assert!(adapter.warm_up().is_err());

    assert_eq!(store.list_vocab().unwrap(), before);
}

#[test]
fn test_furigana_then_search() {
    let mut store = seeded_store();

    let plan = reconcile_furigana(&store.list_vocab().unwrap());
    let summary = apply_furigana_plan(&mut store, &plan).unwrap();
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.skipped, 4);

    let vocab = store.list_vocab().unwrap();
    assert_eq!(vocab[0].furigana.as_deref(), Some("たべた"));

    // Katakana query, hiragana furigana
    let found: Vec<i64> = search_vocab("タベ", &vocab).iter().map(|e| e.id).collect();
    assert_eq!(found, vec![1]);

    let found: Vec<i64> = search_vocab("ＤＲＩＮＫ", &vocab).iter().map(|e| e.id).collect();
    assert_eq!(found, vec![4, 5]);

    assert_eq!(search_vocab("", &vocab).len(), 5);
}

#[test]
fn test_import_json_file() {
    let dir = std::env::temp_dir().join(format!("yomeru-import-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("vocab.json");
    std::fs::write(
        &path,
        r#"[{"word": "毎日", "furigana": "まいにち"}, {"word": "勉強", "meaning": "study"}]"#,
    )
    .unwrap();

    let mut store = SqliteVocabStore::open_in_memory().unwrap();
    assert_eq!(store.import_json(&path).unwrap(), 2);
    assert_eq!(store.count().unwrap(), 2);

    let study = store.find_vocab_by_word("勉強").unwrap().unwrap();
    assert_eq!(study.meaning.as_deref(), Some("study"));
    assert_eq!(study.furigana, None);

    std::fs::remove_dir_all(&dir).unwrap();
}
