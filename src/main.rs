//! `pramef`: convert PRA solver records into Open-PSA MEF XML.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
