//! The persisted best-score collaborator.
//!
//! The engine does not own a storage mechanism. It talks to a narrow
//! key-value seam, [`ScoreStore`], exactly twice per concern: one `get` at
//! session construction to read a previously saved best score, and one `set`
//! per new best score to write it back as a decimal string. Everything else -
//! where the bytes live, durability, formats - belongs to the implementation
//! behind the trait.
//!
//! [`MemoryStore`] is the in-process implementation (and the substitute tests
//! use). With the `json` feature enabled, `JsonFileStore` persists the map
//! to a JSON file on disk.

use std::collections::BTreeMap;

/// The fixed key under which the best score is persisted.
pub const BEST_SCORE_KEY: &str = "lucky-game-best";

/// A persisted string key-value store.
///
/// Absence of a stored value is not an error: a fresh install has no best
/// score, and the session treats `None` (or an unparseable value) as zero.
///
/// Writes happen synchronously inside
/// [`GameSession::resolve_tap`](crate::GameSession::resolve_tap) and reads
/// happen once at construction, so implementations never see concurrent
/// read-modify-write cycles.
pub trait ScoreStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str);
}

/// An in-memory [`ScoreStore`].
///
/// This is the default store a [`SessionBuilder`](crate::SessionBuilder)
/// falls back to, and the substitute tests inject: best scores survive
/// resets within the session but not process restarts.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }
}

/// A [`ScoreStore`] persisted as a JSON object in a single file.
///
/// Persistence is best-effort with graceful degradation, matching the
/// engine's policy that a missing best score is never an error:
/// - A missing, unreadable or corrupt file opens as an empty store (with a
///   `tracing::warn!` for the corrupt case).
/// - A failed write keeps the in-memory value and logs a warning; the game
///   keeps running.
#[cfg(feature = "json")]
#[derive(Debug)]
pub struct JsonFileStore {
    path: std::path::PathBuf,
    entries: BTreeMap<String, String>,
}

#[cfg(feature = "json")]
impl JsonFileStore {
    /// Opens the store at `path`, loading any previously persisted entries.
    #[must_use]
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        %err,
                        "score store file is not a JSON string map, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            // A missing file is the fresh-install case, not a failure
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    /// Returns the path this store persists to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn persist(&self) {
        let serialized = match serde_json::to_string_pretty(&self.entries) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::warn!(%err, "failed to serialize score store, keeping in memory only");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, serialized) {
            tracing::warn!(
                path = %self.path.display(),
                %err,
                "failed to write score store, keeping in memory only"
            );
        }
    }
}

#[cfg(feature = "json")]
impl ScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.persist();
    }
}
