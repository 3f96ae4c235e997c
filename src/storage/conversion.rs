//! One end-to-end conversion: solver JSON in, MEF XML and sequence store out.
//!
//! Nothing is written until the whole document has been built and rendered,
//! so a malformed input leaves both the output file and the store untouched.
//! The XML is staged in a temporary file next to the output and only moved
//! into place after the store has been updated. If that final move fails the
//! store is rolled back.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::{
    domain::{BuildError, Config, Conversion, Document},
    storage::{
        input::{LoadError, SolveInput},
        mef::to_xml_string,
        sequence_store::{SequenceStore, StoreError},
    },
};

/// What a conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Number of fault trees written.
    pub fault_trees: usize,
    /// Number of gates across all fault trees.
    pub gates: usize,
    /// Number of basic events declared in the model data.
    pub basic_events: usize,
    /// Number of sequences in the event tree.
    pub sequences: usize,
    /// The key the sequence logic was stored under.
    pub store_key: String,
}

/// Errors that can occur during a conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// The input could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The records could not be turned into a document.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The document could not be rendered.
    #[error("Failed to render document: {0}")]
    Render(io::Error),

    /// The sequence store could not be updated.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The output file could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        /// The output file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Converts the solver records at `input` into an MEF document at `output`,
/// merging the encoded sequence logic into the configured store.
///
/// # Errors
///
/// Returns an error if the input cannot be loaded or built, or if the store
/// or the output file cannot be written.
pub fn run(input: &Path, output: &Path, config: &Config) -> Result<Summary, ConvertError> {
    let records = SolveInput::load(input)?;
    tracing::debug!("Loaded solver records from {}", input.display());

    let Conversion {
        document,
        sequence_logic,
    } = Document::assemble(&records)?;

    let xml = to_xml_string(&document, config.indent).map_err(ConvertError::Render)?;

    let write_error = |source: io::Error| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    };
    let staged = stage(output, xml.as_bytes()).map_err(write_error)?;

    let store = SequenceStore::open(&config.sequence_store)?;
    let mut updated = store.clone();
    updated.insert(&sequence_logic);
    updated.save()?;

    if let Err(e) = staged.persist(output) {
        tracing::warn!(
            "Rolling back sequence store {} after failing to write {}",
            store.path().display(),
            output.display()
        );
        store.rollback()?;
        return Err(write_error(e.error));
    }

    tracing::info!(
        "Persisted {} sequences under '{}' in {}",
        sequence_logic.sequences().len(),
        sequence_logic.key(),
        store.path().display()
    );
    tracing::info!("Wrote {}", output.display());

    Ok(Summary {
        fault_trees: document.fault_trees.len(),
        gates: document.gate_count(),
        basic_events: document.model_data.len(),
        sequences: document.event_tree.sequences().len(),
        store_key: sequence_logic.key().to_string(),
    })
}

/// Writes `contents` to a temporary file in `output`'s directory.
fn stage(output: &Path, contents: &[u8]) -> io::Result<NamedTempFile> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.flush()?;
    Ok(staged)
}
