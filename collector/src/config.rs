use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration of the collector, read from a YAML file.
///
/// ```yaml
/// chain_name: polkadot
/// endpoint: http://localhost:9933
/// location: /var/lib/metadata_collector
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub chain_name: String,
    /// HTTP endpoint of the node's JSON-RPC API.
    pub endpoint: String,
    /// Directory the collected metadata is saved to. Every chain gets its
    /// own subdirectory.
    #[serde(default = "CollectorConfig::default_location")]
    pub location: PathBuf,
}

impl CollectorConfig {
    pub const LOCATION: &'static str = "/var/lib/metadata_collector";

    fn default_location() -> PathBuf {
        PathBuf::from(Self::LOCATION)
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn location_defaults() {
        let config = CollectorConfig::from_yaml(
            "chain_name: polkadot\nendpoint: http://localhost:9933\n",
        )
        .unwrap();

        assert_eq!(config.chain_name, "polkadot");
        assert_eq!(config.location, PathBuf::from(CollectorConfig::LOCATION));
    }

    #[test]
    fn read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "chain_name: kusama\nendpoint: http://localhost:9934\nlocation: /tmp/dumps"
        )
        .unwrap();

        let config = CollectorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://localhost:9934");
        assert_eq!(config.location, PathBuf::from("/tmp/dumps"));
    }

    #[test]
    fn missing_endpoint_is_rejected() {
        assert!(CollectorConfig::from_yaml("chain_name: polkadot\n").is_err());
    }
}
