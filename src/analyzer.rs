//! Morphological analyzer collaborator.
//!
//! The engine itself is an external black box consumed through the narrow
//! [`Analyzer`] trait: one span of text in, an ordered list of raw tokens out.
//! [`Adapter`] owns the process-wide handle to an engine and loads it lazily
//! on first use:
//!
//! - initialization runs at most once; concurrent first callers block on the
//!   same in-flight load instead of starting their own
//! - a failed load is reported as [`AnalyzerError::Unavailable`] and leaves
//!   the adapter empty, so a later call may try again
//! - once loaded, the engine is shared read-only; calls go straight to it
//!   without locking, which requires the engine to be safe for concurrent
//!   invocation. Wrap engines that are not in [`Serialized`]
//! - [`Adapter::unload`] tears the handle down (requires exclusive access)

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;

use crate::models::{BasicForm, LexicalUnit, UNRESOLVED};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    /// The engine failed to initialize or load its backing data
    #[error("Analyzer unavailable: {0}")]
    Unavailable(String),
    /// A single invocation failed on an initialized engine
    #[error("Analyzer call failed: {0}")]
    CallFailed(String),
}

/// A token exactly as the engine reports it, `"*"` marking unresolved fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzedToken {
    pub surface: String,
    pub pos: String,
    pub pos_detail_1: String,
    pub pos_detail_2: String,
    pub pos_detail_3: String,
    pub conjugated_type: String,
    pub conjugated_form: String,
    pub basic_form: String,
    pub reading: String,
    pub pronunciation: String,
}

impl AnalyzedToken {
    /// Convert into a lexical unit, attaching the recovered whitespace.
    pub fn into_unit(self, whitespace_before: String) -> LexicalUnit {
        LexicalUnit {
            surface: self.surface,
            pos: self.pos,
            pos_detail_1: self.pos_detail_1,
            pos_detail_2: self.pos_detail_2,
            pos_detail_3: self.pos_detail_3,
            conjugated_type: self.conjugated_type,
            conjugated_form: self.conjugated_form,
            basic_form: BasicForm::from(self.basic_form),
            reading: self.reading,
            pronunciation: self.pronunciation,
            whitespace_before,
        }
    }

    /// Reading, if the engine resolved one.
    pub fn resolved_reading(&self) -> Option<&str> {
        if self.reading.is_empty() || self.reading == UNRESOLVED {
            None
        } else {
            Some(&self.reading)
        }
    }
}

/// Parse an IPADIC-format feature string:
/// `pos,pos1,pos2,pos3,conj_type,conj_form,basic_form,reading,pronunciation`.
///
/// Unknown words carry fewer fields; missing or empty ones become `"*"`.
pub fn parse_ipadic_feature(surface: &str, feature: &str) -> AnalyzedToken {
    let mut fields = feature.split(',');
    let mut next = || {
        fields
            .next()
            .filter(|f| !f.is_empty())
            .unwrap_or(UNRESOLVED)
            .to_string()
    };

    AnalyzedToken {
        surface: surface.to_string(),
        pos: next(),
        pos_detail_1: next(),
        pos_detail_2: next(),
        pos_detail_3: next(),
        conjugated_type: next(),
        conjugated_form: next(),
        basic_form: next(),
        reading: next(),
        pronunciation: next(),
    }
}

/// The morphological analyzer capability.
pub trait Analyzer {
    /// Analyze one span of text. Callers never pass newlines; implementations
    /// must not split on them.
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError>;

    /// Make sure the engine is loaded. Batch callers use this to fail fast
    /// before doing any per-item work.
    fn warm_up(&self) -> Result<(), AnalyzerError> {
        Ok(())
    }
}

impl<A: Analyzer + ?Sized> Analyzer for &A {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        (**self).analyze(text)
    }

    fn warm_up(&self) -> Result<(), AnalyzerError> {
        (**self).warm_up()
    }
}

impl<A: Analyzer + ?Sized> Analyzer for Arc<A> {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        (**self).analyze(text)
    }

    fn warm_up(&self) -> Result<(), AnalyzerError> {
        (**self).warm_up()
    }
}

type Loader<A> = Box<dyn Fn() -> Result<A, AnalyzerError> + Send + Sync>;

/// Lazily-initialized, process-wide handle to an engine.
pub struct Adapter<A> {
    engine: OnceCell<A>,
    loader: Loader<A>,
}

impl<A: Analyzer> Adapter<A> {
    /// Create an adapter that runs `loader` on first use.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> Result<A, AnalyzerError> + Send + Sync + 'static,
    {
        Adapter {
            engine: OnceCell::new(),
            loader: Box::new(loader),
        }
    }

    /// Wrap an engine that is already loaded.
    pub fn with_engine(engine: A) -> Self {
        Adapter {
            engine: OnceCell::with_value(engine),
            loader: Box::new(|| {
                Err(AnalyzerError::Unavailable(
                    "engine was unloaded and has no loader".to_string(),
                ))
            }),
        }
    }

    /// The loaded engine, loading it first if needed.
    pub fn engine(&self) -> Result<&A, AnalyzerError> {
        self.engine.get_or_try_init(|| {
            info!("Loading morphological analyzer...");
            let engine = (self.loader)().map_err(|e| match e {
                AnalyzerError::CallFailed(message) => AnalyzerError::Unavailable(message),
                unavailable => unavailable,
            })?;
            info!("Morphological analyzer ready");
            Ok(engine)
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.engine.get().is_some()
    }

    /// Drop the loaded engine; the next call loads it again.
    pub fn unload(&mut self) -> Option<A> {
        self.engine.take()
    }
}

impl<A: Analyzer> Analyzer for Adapter<A> {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        self.engine()?.analyze(text)
    }

    fn warm_up(&self) -> Result<(), AnalyzerError> {
        self.engine().map(|_| ())
    }
}

/// Serializes calls into an engine that is not safe for concurrent use.
pub struct Serialized<A> {
    inner: Mutex<A>,
}

impl<A> Serialized<A> {
    pub fn new(engine: A) -> Self {
        Serialized {
            inner: Mutex::new(engine),
        }
    }
}

impl<A: Analyzer> Analyzer for Serialized<A> {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        let engine = self
            .inner
            .lock()
            .map_err(|_| AnalyzerError::CallFailed("analyzer lock poisoned".to_string()))?;
        engine.analyze(text)
    }
}

/// Greedy longest-match engine over an in-memory lexicon.
///
/// Whitespace is skipped (not emitted), and characters no lexicon entry
/// covers come out one by one with every feature unresolved. Useful for
/// fixtures and for callers without a compiled system dictionary.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    entries: HashMap<String, AnalyzedToken>,
    max_chars: usize,
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a word with an IPADIC-format feature string.
    pub fn with_entry(mut self, surface: &str, feature: &str) -> Self {
        self.insert(parse_ipadic_feature(surface, feature));
        self
    }

    pub fn insert(&mut self, token: AnalyzedToken) {
        self.max_chars = self.max_chars.max(token.surface.chars().count());
        self.entries.insert(token.surface.clone(), token);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn unknown(surface: &str) -> AnalyzedToken {
        parse_ipadic_feature(surface, "")
    }
}

impl Analyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        let mut tokens = Vec::new();
        let mut rest = text;

        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() {
                rest = &rest[c.len_utf8()..];
                continue;
            }

            // Byte ends of the first 1..=max_chars characters, longest first
            let ends: Vec<usize> = rest
                .char_indices()
                .skip(1)
                .map(|(i, _)| i)
                .chain(std::iter::once(rest.len()))
                .take(self.max_chars.max(1))
                .collect();

            let matched = ends
                .iter()
                .rev()
                .find_map(|&end| self.entries.get(&rest[..end]).map(|t| (end, t.clone())));

            let (end, token) = match matched {
                Some(found) => found,
                None => (c.len_utf8(), Self::unknown(&rest[..c.len_utf8()])),
            };

            tokens.push(token);
            rest = &rest[end..];
        }

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lexicon() -> LexiconAnalyzer {
        LexiconAnalyzer::new()
            .with_entry("学生", "名詞,一般,*,*,*,*,学生,ガクセイ,ガクセー")
            .with_entry("学", "名詞,一般,*,*,*,*,学,ガク,ガク")
            .with_entry("です", "助動詞,*,*,*,特殊・デス,基本形,です,デス,デス")
    }

    #[test]
    fn test_parse_full_feature() {
        let token = parse_ipadic_feature("食べた", "動詞,自立,*,*,一段,連用タ接続,食べる,タベタ,タベタ");
        assert_eq!(token.surface, "食べた");
        assert_eq!(token.pos, "動詞");
        assert_eq!(token.pos_detail_1, "自立");
        assert_eq!(token.conjugated_type, "一段");
        assert_eq!(token.basic_form, "食べる");
        assert_eq!(token.reading, "タベタ");
        assert_eq!(token.pronunciation, "タベタ");
    }

    #[test]
    fn test_parse_short_feature_pads_unresolved() {
        // Unknown words in IPADIC have no reading fields
        let token = parse_ipadic_feature("ＸＹＺ", "名詞,固有名詞,組織,*,*,*,*");
        assert_eq!(token.basic_form, "*");
        assert_eq!(token.reading, "*");
        assert_eq!(token.resolved_reading(), None);
    }

    #[test]
    fn test_lexicon_longest_match() {
        let tokens = lexicon().analyze("学生です").unwrap();
        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["学生", "です"]);
    }

    #[test]
    fn test_lexicon_skips_whitespace_and_splits_unknown() {
        let tokens = lexicon().analyze(" 学　x").unwrap();
        let surfaces: Vec<&str> = tokens.iter().map(|t| t.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["学", "x"]);
        assert_eq!(tokens[1].basic_form, "*");
    }

    #[test]
    fn test_adapter_loads_once() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let adapter = Adapter::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(lexicon())
        });

        assert!(!adapter.is_loaded());
        adapter.analyze("学生").unwrap();
        adapter.analyze("です").unwrap();
        assert!(adapter.is_loaded());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_adapter_concurrent_first_use() {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let adapter = Arc::new(Adapter::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(20));
            Ok(lexicon())
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let adapter = Arc::clone(&adapter);
                std::thread::spawn(move || adapter.analyze("学生").unwrap().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_adapter_load_failure_is_unavailable() {
        let adapter: Adapter<LexiconAnalyzer> =
            Adapter::new(|| Err(AnalyzerError::CallFailed("dict missing".to_string())));

        let err = adapter.analyze("学生").unwrap_err();
        assert_eq!(err, AnalyzerError::Unavailable("dict missing".to_string()));
        assert!(adapter.warm_up().is_err());
        assert!(!adapter.is_loaded());
    }

    #[test]
    fn test_adapter_unload_and_reload() {
        let mut adapter = Adapter::new(|| Ok(lexicon()));
        adapter.warm_up().unwrap();
        assert!(adapter.unload().is_some());
        assert!(!adapter.is_loaded());
        adapter.warm_up().unwrap();
        assert!(adapter.is_loaded());
    }

    #[test]
    fn test_preloaded_adapter_cannot_reload() {
        let mut adapter = Adapter::with_engine(lexicon());
        assert!(adapter.is_loaded());
        assert_eq!(adapter.analyze("学生").unwrap().len(), 1);

        assert!(adapter.unload().is_some());
        assert!(matches!(adapter.warm_up(), Err(AnalyzerError::Unavailable(_))));
        assert!(matches!(adapter.analyze("学生"), Err(AnalyzerError::Unavailable(_))));
        assert!(!adapter.is_loaded());
    }

    #[test]
    fn test_serialized_engine() {
        let engine = Serialized::new(lexicon());
        let tokens = engine.analyze("学生です").unwrap();
        assert_eq!(tokens.len(), 2);
    }
}
