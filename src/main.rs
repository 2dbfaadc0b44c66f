use anyhow::Result;
use clap::Parser;

use tilegram::cli::{Cli, Commands};
use tilegram::commands::{generate, init_logger, render};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match &cli.command {
        Commands::Generate(args) => generate::run(&cli, args),
        Commands::Render(args) => render::run(&cli, args),
    }
}
