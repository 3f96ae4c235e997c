use std::path::PathBuf;

mod convert;
mod encode;

use clap::ArgAction;
use convert::Convert;
use encode::Encode;

/// Default location of the configuration file.
const DEFAULT_CONFIG: &str = "pramef.toml";

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = pramef::Config::load_or_default(&self.config)
            .map_err(|e| anyhow::anyhow!("{}: {e}", self.config.display()))?;
        self.command.run(config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Convert a solver record file into an MEF document
    ///
    /// The encoded sequence logic is merged into the sequence store.
    Convert(Convert),

    /// Print the encoded form of raw sequence terms
    Encode(Encode),
}

impl Command {
    fn run(self, config: pramef::Config) -> anyhow::Result<()> {
        match self {
            Self::Convert(command) => command.run(config)?,
            Self::Encode(command) => command.run(),
        }
        Ok(())
    }
}
