pub mod model;
pub mod token;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub use model::{LoggingConfig, ProbeConfig, ReaderConfig, ServerConfig, TimeoutConfig};

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ircprobe")
        .join("config.toml")
}

/// Load the probe configuration.
///
/// With an explicit `path` the file must exist. Without one, the per-user
/// default location is tried and a missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<ProbeConfig> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                bail!("Config file {} does not exist", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = config_path();
            if !p.exists() {
                return Ok(ProbeConfig::default());
            }
            p
        }
    };
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: ProbeConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = Path::new("/nonexistent/ircprobe/config.toml");
        assert!(load_config(Some(missing)).is_err());
    }

    #[test]
    fn explicit_file_is_parsed() {
        let path = std::env::temp_dir().join(format!("ircprobe-test-{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nhost = \"irc.test\"\nport = 7000\n").unwrap();
        let cfg = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.server.endpoint(), "irc.test:7000");
    }
}
