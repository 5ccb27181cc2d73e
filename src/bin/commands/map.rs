use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;

use pfxmap::context::Context;
use pfxmap::pipeline::{run_map, MapInputs};
use pfxmap::PfxmapConfig;

/// Arguments for the map command
#[derive(Args)]
pub struct MapArgs {
    /// JSON dump produced by the RPKI validator
    #[clap(long)]
    pub rpki_json: PathBuf,

    /// IRR database files; omit to skip the IRR layer
    #[clap(long)]
    pub irr_file: Vec<PathBuf>,

    /// Route-collector prefix-to-ASN file; omit to skip that layer
    #[clap(long)]
    pub rv_file: Option<PathBuf>,

    /// Output directory; defaults to the configured data directory
    #[clap(short, long)]
    pub out: Option<PathBuf>,

    /// Reject ASNs above this value; 0 disables the check
    #[clap(long)]
    pub max_encode: Option<u32>,
}

pub fn run(config: &PfxmapConfig, args: MapArgs) -> Result<()> {
    if !args.rpki_json.is_file() {
        return Err(anyhow!(
            "RPKI input {} does not exist",
            args.rpki_json.display()
        ));
    }

    let base_dir = args
        .out
        .unwrap_or_else(|| PathBuf::from(&config.data_dir));
    let max_encode = args.max_encode.unwrap_or(config.max_encode);
    let ctx = Context::new(&base_dir, max_encode)?;

    let final_map = run_map(
        &ctx,
        &MapInputs {
            rpki_json: args.rpki_json,
            irr_files: args.irr_file,
            collectors_file: args.rv_file,
        },
    )?;

    println!("{}", final_map.display());
    Ok(())
}
