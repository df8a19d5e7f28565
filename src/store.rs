//! Vocabulary storage: the collaborator interface and its SQLite backend.

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;

use crate::models::{NewVocab, VocabEntry, VocabUpdate};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Vocab not found: {0}")]
    VocabNotFound(i64),
}

/// Persistence operations the core relies on. Each call is atomic and
/// immediately visible to the next one.
pub trait VocabStore {
    fn list_vocab(&self) -> Result<Vec<VocabEntry>, StoreError>;

    /// Lowest-id entry whose word equals `word`.
    fn find_vocab_by_word(&self, word: &str) -> Result<Option<VocabEntry>, StoreError>;

    fn update_vocab(&mut self, id: i64, update: &VocabUpdate) -> Result<(), StoreError>;

    fn insert_vocab(&mut self, vocab: &NewVocab) -> Result<i64, StoreError>;
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS vocabs (
    id       INTEGER PRIMARY KEY,
    word     TEXT NOT NULL,
    furigana TEXT,
    meaning  TEXT,
    notes    TEXT
);
CREATE INDEX IF NOT EXISTS idx_vocabs_word ON vocabs(word);";

/// SQLite-backed vocabulary store.
pub struct SqliteVocabStore {
    conn: Connection,
}

impl SqliteVocabStore {
    /// Open (or create) a database file.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteVocabStore { conn })
    }

    /// Insert many entries in a single transaction. Returns the new ids.
    pub fn insert_all(&mut self, vocab: &[NewVocab]) -> Result<Vec<i64>, StoreError> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(vocab.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO vocabs (word, furigana, meaning, notes) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for v in vocab {
                stmt.execute(params![v.word, v.furigana, v.meaning, v.notes])?;
                ids.push(tx.last_insert_rowid());
            }
        }
        tx.commit()?;
        Ok(ids)
    }

    /// Load a JSON array of entries (`word`, optional `furigana`, `meaning`,
    /// `notes`) from a file.
    pub fn import_json(&mut self, path: &Path) -> Result<usize, StoreError> {
        let file = std::fs::File::open(path)?;
        let vocab: Vec<NewVocab> = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(self.insert_all(&vocab)?.len())
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM vocabs", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_vocab(row: &Row<'_>) -> rusqlite::Result<VocabEntry> {
    Ok(VocabEntry {
        id: row.get(0)?,
        word: row.get(1)?,
        furigana: row.get(2)?,
        meaning: row.get(3)?,
        notes: row.get(4)?,
    })
}

impl VocabStore for SqliteVocabStore {
    fn list_vocab(&self) -> Result<Vec<VocabEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, word, furigana, meaning, notes FROM vocabs ORDER BY id")?;
        let rows = stmt.query_map([], row_to_vocab)?;

        let mut vocab = Vec::new();
        for row in rows {
            vocab.push(row?);
        }
        Ok(vocab)
    }

    fn find_vocab_by_word(&self, word: &str) -> Result<Option<VocabEntry>, StoreError> {
        let entry = self
            .conn
            .query_row(
                "SELECT id, word, furigana, meaning, notes FROM vocabs
                 WHERE word = ?1
                 ORDER BY id
                 LIMIT 1",
                [word],
                row_to_vocab,
            )
            .optional()?;
        Ok(entry)
    }

    fn update_vocab(&mut self, id: i64, update: &VocabUpdate) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE vocabs SET
                 word     = COALESCE(?1, word),
                 furigana = COALESCE(?2, furigana),
                 meaning  = COALESCE(?3, meaning),
                 notes    = COALESCE(?4, notes)
             WHERE id = ?5",
            params![update.word, update.furigana, update.meaning, update.notes, id],
        )?;

        if changed == 0 {
            return Err(StoreError::VocabNotFound(id));
        }
        Ok(())
    }

    fn insert_vocab(&mut self, vocab: &NewVocab) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO vocabs (word, furigana, meaning, notes) VALUES (?1, ?2, ?3, ?4)",
            params![vocab.word, vocab.furigana, vocab.meaning, vocab.notes],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}
