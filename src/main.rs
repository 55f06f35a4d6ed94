mod calculator;
mod catalog;
mod cli;
mod error;
mod filters;
mod fmt;
mod models;
mod parse;
mod query;
mod ranking;
mod rules;
mod settings;
mod store;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{CacheCommands, Cli, Commands};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            data_dir,
            feed_url,
            strict_filters,
        } => cli::init::run(data_dir, feed_url, strict_filters),
        Commands::Cards { refresh } => cli::cards::run(refresh),
        Commands::Rank {
            spend,
            filter,
            sort,
            asc,
            limit,
            format,
        } => cli::rank::run(&spend, &filter, sort, asc, limit, format),
        Commands::Show { card, spend } => cli::show::run(&card, &spend),
        Commands::Compare { cards, spend } => cli::compare::run(&cards, &spend),
        Commands::Filters => cli::filters::run(),
        Commands::Share {
            spend,
            cards,
            base_url,
        } => cli::share::run(&spend, &cards, base_url.as_deref()),
        Commands::Cache { command } => match command {
            CacheCommands::Status => cli::cache::status(),
            CacheCommands::Clear { all } => cli::cache::clear(all),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cardwise", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
