use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tabled::settings::Style;
use tabled::Table;

use pfxmap::coverage::coverage;

/// Arguments for the cov command
#[derive(Args)]
pub struct CovArgs {
    /// Prefix-to-ASN map to check against
    pub map: PathBuf,

    /// List of IP addresses, one per line
    pub list: PathBuf,

    /// Write covered addresses with their ASN to this file
    #[clap(long)]
    pub covered: Option<PathBuf>,

    /// Write uncovered addresses to this file
    #[clap(long)]
    pub uncovered: Option<PathBuf>,
}

pub fn run(args: CovArgs) -> Result<()> {
    let report = coverage(&args.map, &args.list)?;

    println!(
        "{}",
        Table::new(vec![report.summary()]).with(Style::rounded())
    );

    if let Some(path) = args.covered {
        report.write_covered(&path)?;
        println!("wrote {} covered addresses to {}", report.covered.len(), path.display());
    }
    if let Some(path) = args.uncovered {
        report.write_uncovered(&path)?;
        println!(
            "wrote {} uncovered addresses to {}",
            report.uncovered.len(),
            path.display()
        );
    }
    Ok(())
}
