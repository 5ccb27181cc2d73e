use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Result};
use config::Config;

/// Highest ASN the downstream asmap encoder can currently represent.
pub const DEFAULT_MAX_ENCODE: u32 = 33521664;

pub struct PfxmapConfig {
    /// Path to the directory holding per-run output directories
    pub data_dir: String,

    /// Reject ASNs above this value; 0 disables the check
    pub max_encode: u32,
}

const EMPTY_CONFIG: &str = r#"### pfxmap configuration file

### directory for per-run output written by pfxmap
# data_dir = "~/.pfxmap"

### highest ASN the asmap encoder supports; 0 disables the check
# max_encode = 33521664
"#;

impl Default for PfxmapConfig {
    fn default() -> Self {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());

        Self {
            data_dir: format!("{}/.pfxmap", home_dir),
            max_encode: DEFAULT_MAX_ENCODE,
        }
    }
}

impl PfxmapConfig {
    /// Create and initialize a configuration, writing a commented template
    /// on first run. By default `$HOME/.pfxmap/pfxmap.toml` is used.
    pub fn new(path: &Option<String>) -> Result<PfxmapConfig> {
        let mut builder = Config::builder();

        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not find home directory"))?
            .to_str()
            .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
            .to_owned();

        let pfxmap_dir = format!("{}/.pfxmap", home_dir.as_str());

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if path.exists() {
                    let path_str = path
                        .to_str()
                        .ok_or_else(|| anyhow!("Could not convert path to string"))?;
                    builder = builder.add_source(config::File::with_name(path_str));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG)
                        .map_err(|e| anyhow!("Unable to create config file: {}", e))?;
                }
            }
            None => {
                std::fs::create_dir_all(pfxmap_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create pfxmap directory: {}", e))?;
                let p = format!("{}/pfxmap.toml", pfxmap_dir.as_str());
                if Path::new(p.as_str()).exists() {
                    builder = builder.add_source(config::File::with_name(p.as_str()));
                } else {
                    std::fs::write(p.as_str(), EMPTY_CONFIG).map_err(|e| {
                        anyhow!("Unable to create config file {}: {}", p.as_str(), e)
                    })?;
                }
            }
        }

        // Settings from the environment override the file, e.g.
        // `PFXMAP_MAX_ENCODE=0 pfxmap map ...`
        builder = builder.add_source(config::Environment::with_prefix("PFXMAP"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match config.get("data_dir") {
            Some(p) => p.to_string(),
            None => {
                let dir = format!("{}/.pfxmap", home_dir.as_str());
                std::fs::create_dir_all(dir.as_str())
                    .map_err(|e| anyhow!("Unable to create data directory: {}", e))?;
                dir
            }
        };

        let max_encode = config
            .get("max_encode")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_ENCODE);

        Ok(PfxmapConfig {
            data_dir,
            max_encode,
        })
    }
}
