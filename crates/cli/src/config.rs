//! CLI configuration utilities

use anyhow::Result;
use shopkeep_client::ClientConfig;
use std::path::Path;

/// Write the default client configuration as TOML
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&ClientConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
