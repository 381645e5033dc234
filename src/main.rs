mod cli;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    scout::logging::init(cli.verbose);
    cli::dispatch(cli)
}
