use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod matching;
mod parsing;
mod stream;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("callset_diff=debug,info")
    } else {
        EnvFilter::new("callset_diff=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Discover(args) => {
            cli::discover::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::CheckSort(args) => {
            cli::check_sort::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
