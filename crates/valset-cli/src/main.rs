/*!
Command line tools for valset.
*/

mod commands;
mod preprocess;

use anyhow::Result;
use clap::Parser;
use commands::Command;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Valset {
    #[clap(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();

    let args = Valset::parse();
    commands::run(args.command)
}
