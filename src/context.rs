//! Per-run bookkeeping: output directory layout and the gate settings
//! shared by every stage of one run.
//!
//! A `Context` is constructed at the start of a run and dropped at the
//! end; nothing in it outlives the invocation except the files it names.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::dedup::Gate;
use crate::error::Result;

#[derive(Debug)]
pub struct Context {
    /// Unix timestamp identifying this run; the output directory is named
    /// after it.
    pub epoch: i64,
    pub out_dir: PathBuf,
    pub out_dir_rpki: PathBuf,
    pub out_dir_irr: PathBuf,
    pub out_dir_collectors: PathBuf,
    /// Canonical result artifact, a copy of the sorted final map.
    pub final_result_file: PathBuf,
    pub gate: Gate,
}

impl Context {
    /// Create the run's directory tree under `base_dir`.
    pub fn new(base_dir: &Path, max_encode: u32) -> Result<Context> {
        let epoch = Utc::now().timestamp();
        Self::with_epoch(base_dir, max_encode, epoch)
    }

    pub fn with_epoch(base_dir: &Path, max_encode: u32, epoch: i64) -> Result<Context> {
        let out_dir = base_dir.join(epoch.to_string());
        let out_dir_rpki = out_dir.join("rpki");
        let out_dir_irr = out_dir.join("irr");
        let out_dir_collectors = out_dir.join("collectors");
        for dir in [&out_dir, &out_dir_rpki, &out_dir_irr, &out_dir_collectors] {
            fs::create_dir_all(dir)?;
        }

        Ok(Context {
            epoch,
            final_result_file: out_dir.join("final_result.txt"),
            out_dir,
            out_dir_rpki,
            out_dir_irr,
            out_dir_collectors,
            gate: Gate::new(max_encode),
        })
    }
}
