use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use pfxmap::merge::merge_files;

/// Arguments for the merge command
#[derive(Args)]
pub struct MergeArgs {
    /// Base map file; its entries always survive
    #[clap(short, long)]
    pub base: PathBuf,

    /// Extra map file; entries covered by the base are dropped
    #[clap(short, long)]
    pub extra: PathBuf,

    /// Output file for the merged map
    #[clap(short, long)]
    pub output: PathBuf,
}

pub fn run(args: MergeArgs) -> Result<()> {
    let stats = merge_files(&args.base, &args.extra, None, &args.output)?;
    println!(
        "merged {} base entries with {} candidates, {} retained -> {}",
        stats.base_entries,
        stats.candidates_total,
        stats.candidates_retained,
        args.output.display()
    );
    Ok(())
}
