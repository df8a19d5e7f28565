//! Morphological analysis backed by a compiled vibrato system dictionary.
//!
//! Dictionaries are the zstd-compressed IPADIC builds vibrato distributes
//! (`system.dic.zst`); features come back as IPADIC strings.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vibrato::{Dictionary, Tokenizer};

use crate::analyzer::{parse_ipadic_feature, Adapter, AnalyzedToken, Analyzer, AnalyzerError};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// zstd-compressed system dictionary
    pub dictionary: PathBuf,
    /// Drop whitespace tokens inside a span
    pub ignore_space: bool,
    /// Longest run of unknown characters grouped into one token (0 = no limit)
    pub max_grouping_len: usize,
}

impl EngineConfig {
    pub fn new(dictionary: impl Into<PathBuf>) -> Self {
        Self {
            dictionary: dictionary.into(),
            ignore_space: false,
            max_grouping_len: 0,
        }
    }
}

/// vibrato tokenizer exposed through [`Analyzer`].
///
/// The tokenizer is immutable once built; each call gets its own worker, so
/// calls from several threads need no locking.
pub struct VibratoAnalyzer {
    tokenizer: Tokenizer,
}

impl VibratoAnalyzer {
    /// Load the dictionary named in `config`.
    pub fn load(config: &EngineConfig) -> Result<Self, AnalyzerError> {
        info!(dictionary = %config.dictionary.display(), "Loading the dictionary...");
        let file = File::open(&config.dictionary).map_err(|e| {
            AnalyzerError::Unavailable(format!("{}: {}", config.dictionary.display(), e))
        })?;
        let dict = Self::read_zstd(BufReader::new(file), &config.dictionary)?;

        let tokenizer = Tokenizer::new(dict)
            .ignore_space(config.ignore_space)
            .map_err(|e| AnalyzerError::Unavailable(e.to_string()))?
            .max_grouping_len(config.max_grouping_len);

        Ok(VibratoAnalyzer { tokenizer })
    }

    /// Load a dictionary with default tokenizer settings.
    pub fn from_zstd(path: &Path) -> Result<Self, AnalyzerError> {
        Self::load(&EngineConfig::new(path))
    }

    fn read_zstd<R: std::io::Read>(reader: R, path: &Path) -> Result<Dictionary, AnalyzerError> {
        let decoder = zstd::Decoder::new(reader)
            .map_err(|e| AnalyzerError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Dictionary::read(decoder)
            .map_err(|e| AnalyzerError::Unavailable(format!("{}: {}", path.display(), e)))
    }
}

impl Analyzer for VibratoAnalyzer {
    fn analyze(&self, text: &str) -> Result<Vec<AnalyzedToken>, AnalyzerError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();

        let tokens: Vec<AnalyzedToken> = (0..worker.num_tokens())
            .map(|i| {
                let token = worker.token(i);
                parse_ipadic_feature(token.surface(), token.feature())
            })
            .collect();

        debug!(chars = text.chars().count(), tokens = tokens.len(), "Analyzed span");
        Ok(tokens)
    }
}

/// An adapter that loads the configured dictionary on first use.
pub fn adapter(config: EngineConfig) -> Adapter<VibratoAnalyzer> {
    Adapter::new(move || VibratoAnalyzer::load(&config))
}
