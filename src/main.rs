use clap::Parser;
use toolforge::cli::{run, Cli};
use toolforge::init_logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;

    run(cli)
}
