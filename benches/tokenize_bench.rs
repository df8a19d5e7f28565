//! Criterion benchmarks for tokenization, matching and reconciliation.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use yomeru_core::analyzer::LexiconAnalyzer;
use yomeru_core::matcher::annotate;
use yomeru_core::models::{ReconcileParams, VocabEntry};
use yomeru_core::normalize::normalize_for_search;
use yomeru_core::reconcile::reconcile;
use yomeru_core::search::search_vocab;
use yomeru_core::sentence::extract_sentence;
use yomeru_core::tokenize::tokenize;

fn lexicon() -> LexiconAnalyzer {
    LexiconAnalyzer::new()
        .with_entry("私", "名詞,代名詞,一般,*,*,*,私,ワタシ,ワタシ")
        .with_entry("は", "助詞,係助詞,*,*,*,*,は,ハ,ワ")
        .with_entry("学生", "名詞,一般,*,*,*,*,学生,ガクセイ,ガクセー")
        .with_entry("です", "助動詞,*,*,*,特殊・デス,基本形,です,デス,デス")
        .with_entry("。", "記号,句点,*,*,*,*,。,。,。")
        .with_entry("寿司", "名詞,一般,*,*,*,*,寿司,スシ,スシ")
        .with_entry("を", "助詞,格助詞,一般,*,*,*,を,ヲ,ヲ")
        .with_entry("食べた", "動詞,自立,*,*,一段,連用タ接続,食べる,タベタ,タベタ")
        .with_entry("食べる", "動詞,自立,*,*,一段,基本形,食べる,タベル,タベル")
}

/// `lines` lines of a short paragraph, some indented.
fn sample_text(lines: usize) -> String {
    (0..lines)
        .map(|i| {
            if i % 3 == 0 {
                "  私は学生です。寿司を食べた。"
            } else {
                "私は学生です。 寿司を食べた。"
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn vocab(size: usize) -> Vec<VocabEntry> {
    let words = ["食べた", "学生", "寿司", "食べる", "私"];
    (0..size)
        .map(|i| VocabEntry {
            id: i as i64 + 1,
            word: if i < words.len() {
                words[i].to_string()
            } else {
                format!("{}{}", words[i % words.len()], i)
            },
            furigana: Some("タベル".to_string()),
            meaning: Some(format!("meaning {}", i)),
            notes: None,
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let analyzer = lexicon();
    let mut group = c.benchmark_group("tokenize");

    for lines in [10, 100, 1000] {
        let text = sample_text(lines);
        group.bench_with_input(BenchmarkId::new("lines", lines), &lines, |b, _| {
            b.iter(|| tokenize(&analyzer, black_box(&text)))
        });
    }

    group.finish();
}

fn bench_context(c: &mut Criterion) {
    let analyzer = lexicon();
    let units = tokenize(&analyzer, &sample_text(1000)).unwrap_or_default();
    let vocab = vocab(1000);

    let mut group = c.benchmark_group("context");

    group.bench_function("extract_sentence", |b| {
        let middle = units.len() / 2 + 1;
        b.iter(|| extract_sentence(black_box(&units), middle))
    });

    group.bench_function("annotate", |b| {
        b.iter(|| annotate(black_box(&units), black_box(&vocab)).len())
    });

    group.finish();
}

fn bench_vocab(c: &mut Criterion) {
    let analyzer = lexicon();
    let mut group = c.benchmark_group("vocab");

    for size in [100, 1000, 10000] {
        let vocab = vocab(size);

        group.bench_with_input(BenchmarkId::new("search", size), &size, |b, _| {
            b.iter(|| search_vocab(black_box("タベ"), &vocab).len())
        });

        group.bench_with_input(BenchmarkId::new("reconcile", size), &size, |b, _| {
            b.iter(|| reconcile(&analyzer, black_box(&vocab), &ReconcileParams::default(), false))
        });
    }

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let text = "コンピューターＡＢＣ１２３とプログラミング".repeat(50);
    c.bench_function("normalize_for_search", |b| {
        b.iter(|| normalize_for_search(black_box(&text)))
    });
}

criterion_group!(benches, bench_tokenize, bench_context, bench_vocab, bench_normalize);
criterion_main!(benches);
