use std::path::PathBuf;

use clap::Parser;
use pramef::{Config, storage::conversion};
use tracing::instrument;

#[derive(Debug, Parser)]
pub struct Convert {
    /// The solver record file (JSON)
    input: PathBuf,

    /// Where to write the MEF document
    ///
    /// Defaults to the input path with an `.xml` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the configured sequence store
    #[arg(long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Override the configured indentation width (0 for a single line)
    #[arg(long)]
    indent: Option<usize>,
}

impl Convert {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, mut config: Config) -> anyhow::Result<()> {
        if let Some(store) = self.store {
            config.sequence_store = store;
        }
        if let Some(indent) = self.indent {
            config.indent = indent;
        }
        let output = self
            .output
            .unwrap_or_else(|| self.input.with_extension("xml"));

        let summary = conversion::run(&self.input, &output, &config)?;

        println!("Wrote {}", output.display());
        println!(
            "  {} fault trees, {} gates, {} basic events, {} sequences",
            summary.fault_trees, summary.gates, summary.basic_events, summary.sequences
        );
        println!(
            "  Sequence logic stored as '{}' in {}",
            summary.store_key,
            config.sequence_store.display()
        );
        Ok(())
    }
}
