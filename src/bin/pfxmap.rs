use clap::{Parser, Subcommand};
use tracing::Level;

use pfxmap::PfxmapConfig;

mod commands;

use commands::cov::CovArgs;
use commands::map::MapArgs;
use commands::merge::MergeArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.pfxmap/pfxmap.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a prefix-to-ASN map from RPKI, IRR, and collector data
    Map(MapArgs),
    /// Merge an extra map file into a base map file
    Merge(MergeArgs),
    /// Report how much of an address list a map covers
    Cov(CovArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match PfxmapConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Map(args) => commands::map::run(&config, args),
        Commands::Merge(args) => commands::merge::run(args),
        Commands::Cov(args) => commands::cov::run(args),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
