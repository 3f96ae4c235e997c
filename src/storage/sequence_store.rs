//! A JSON file mapping event-tree keys to their encoded sequence logic.
//!
//! The store is an object of the form
//! `{"<event-tree-name>-<sqcount>": [["s65", "f20481"], ...], ...}`.
//! Writing one key never touches the others. Entries this crate did not write
//! are preserved verbatim, whatever their shape.
//!
//! The read-modify-write cycle is not atomic. Two processes converting into
//! the same store concurrently can lose each other's updates; callers that
//! need concurrency must use separate stores or lock externally.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Deserialize as _;
use serde_json::{Map, Value};

use crate::domain::{EncodedTerm, SequenceLogic};

/// An open sequence store.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStore {
    path: PathBuf,
    entries: Map<String, Value>,
    on_disk: bool,
}

/// Errors that can occur while reading or writing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store file could not be read or written.
    #[error("Failed to access sequence store {path}: {source}")]
    Io {
        /// The store file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The store file is not valid JSON, or an entry has the wrong shape.
    #[error("Invalid sequence store {path}: {source}")]
    Json {
        /// The store file.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },

    /// The store file holds valid JSON that is not an object.
    #[error("Invalid sequence store {0}: expected a JSON object")]
    NotAnObject(PathBuf),
}

impl SequenceStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, or does not
    /// hold a JSON object.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let (entries, on_disk) = match File::open(path) {
            Ok(file) => {
                let value: Value =
                    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                        StoreError::Json {
                            path: path.to_path_buf(),
                            source,
                        }
                    })?;
                match value {
                    Value::Object(entries) => (entries, true),
                    _ => return Err(StoreError::NotAnObject(path.to_path_buf())),
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No sequence store at {}, starting empty", path.display());
                (Map::new(), false)
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            on_disk,
        })
    }

    /// The store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The keys currently held, in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Inserts (or replaces) the entry for `logic`'s key.
    pub fn insert(&mut self, logic: &SequenceLogic) {
        let sequences = logic
            .sequences()
            .iter()
            .map(|terms| {
                Value::Array(
                    terms
                        .iter()
                        .map(|term| Value::String(term.to_string()))
                        .collect(),
                )
            })
            .collect();
        self.entries
            .insert(logic.key().to_string(), Value::Array(sequences));
    }

    /// Decodes the entry stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is not a list of lists of encoded terms.
    pub fn entry(&self, key: &str) -> Result<Option<Vec<Vec<EncodedTerm>>>, StoreError> {
        self.entries
            .get(key)
            .map(|value| {
                Vec::<Vec<EncodedTerm>>::deserialize(value).map_err(|source| StoreError::Json {
                    path: self.path.clone(),
                    source,
                })
            })
            .transpose()
    }

    /// Writes the store back to its file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<(), StoreError> {
        let io_error = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = File::create(&self.path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.entries).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        writer.flush().map_err(io_error)
    }

    /// Puts the file back the way this store found it when it was opened.
    ///
    /// The entries are written back if the file existed; otherwise the file
    /// is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or removed.
    pub fn rollback(&self) -> Result<(), StoreError> {
        if self.on_disk {
            return self.save();
        }
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(StoreError::Io {
                path: self.path.clone(),
                source: e,
            }),
            _ => Ok(()),
        }
    }
}

/// Merges `logic` into the store at `path`.
///
/// Entries under other keys are left untouched.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn persist_sequence_logic(path: &Path, logic: &SequenceLogic) -> Result<(), StoreError> {
    let mut store = SequenceStore::open(path)?;
    store.insert(logic);
    store.save()?;
    tracing::info!(
        "Persisted {} sequences under '{}' in {}",
        logic.sequences().len(),
        logic.key(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn logic(name: &str, count: u32, terms: &[&[u64]]) -> SequenceLogic {
        SequenceLogic::new(
            name,
            count,
            terms
                .iter()
                .map(|seq| seq.iter().map(|t| EncodedTerm::encode(*t)).collect())
                .collect(),
        )
    }

    #[test]
    fn missing_file_is_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = SequenceStore::open(&tmp.path().join("store.json")).unwrap();
        assert_eq!(store.keys().count(), 0);
    }

    #[test]
    fn persist_creates_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("store.json");

        persist_sequence_logic(&path, &logic("LOOP", 2, &[&[65, 151_553], &[]])).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({"LOOP-2": [["s65", "f20481"], []]}));
    }

    #[test]
    fn persisting_preserves_other_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(
            &path,
            r#"{"OTHER-3": [["s1"]], "LEGACY": {"anything": [1, 2, 3]}}"#,
        )
        .unwrap();

        persist_sequence_logic(&path, &logic("LOOP", 1, &[&[7]])).unwrap();

        let store = SequenceStore::open(&path).unwrap();
        let mut keys: Vec<&str> = store.keys().collect();
        keys.sort_unstable();
        assert_eq!(keys, ["LEGACY", "LOOP-1", "OTHER-3"]);
        assert_eq!(
            store.entry("OTHER-3").unwrap(),
            Some(vec![vec![EncodedTerm::encode(1)]])
        );
        assert_eq!(
            store.entries["LEGACY"],
            serde_json::json!({"anything": [1, 2, 3]})
        );
    }

    #[test]
    fn persisting_same_key_replaces_entry() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");

        persist_sequence_logic(&path, &logic("LOOP", 1, &[&[1, 2]])).unwrap();
        persist_sequence_logic(&path, &logic("LOOP", 1, &[&[3]])).unwrap();

        let store = SequenceStore::open(&path).unwrap();
        assert_eq!(store.keys().count(), 1);
        assert_eq!(
            store.entry("LOOP-1").unwrap(),
            Some(vec![vec![EncodedTerm::encode(3)]])
        );
    }

    #[test]
    fn rewriting_keeps_key_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, r#"{"ZETA-1":[["s1"]],"ALPHA-1":[["s2"]]}"#).unwrap();

        persist_sequence_logic(&path, &logic("MID", 1, &[&[3]])).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"ZETA-1":[["s1"]],"ALPHA-1":[["s2"]],"MID-1":[["s3"]]}"#
        );
    }

    #[test]
    fn rollback_restores_previous_entries() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, r#"{"OTHER-3":[["s1"]]}"#).unwrap();

        let before = SequenceStore::open(&path).unwrap();
        let mut after = before.clone();
        after.insert(&logic("LOOP", 1, &[&[7]]));
        after.save().unwrap();
        before.rollback().unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"OTHER-3":[["s1"]]}"#
        );
    }

    #[test]
    fn rollback_removes_new_store() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");

        let before = SequenceStore::open(&path).unwrap();
        let mut after = before.clone();
        after.insert(&logic("LOOP", 1, &[&[7]]));
        after.save().unwrap();
        assert!(path.exists());

        before.rollback().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn entry_of_unknown_key_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = SequenceStore::open(&tmp.path().join("store.json")).unwrap();
        assert_eq!(store.entry("NOPE-1").unwrap(), None);
    }

    #[test]
    fn malformed_entry_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, r#"{"BAD-1": [["x9"]]}"#).unwrap();

        let store = SequenceStore::open(&path).unwrap();
        assert!(matches!(
            store.entry("BAD-1"),
            Err(StoreError::Json { .. })
        ));
    }

    #[test]
    fn non_object_store_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert!(matches!(
            SequenceStore::open(&path),
            Err(StoreError::NotAnObject(_))
        ));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("store.json");
        std::fs::write(&path, "{not json").unwrap();

        let error = persist_sequence_logic(&path, &logic("LOOP", 1, &[])).unwrap_err();
        assert!(matches!(error, StoreError::Json { .. }));
        // the unreadable store is left as it was
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}
