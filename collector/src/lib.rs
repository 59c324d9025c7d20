//! Collects the runtime metadata of a chain and saves it to disk, together
//! with the runtime version it belongs to.

#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

use metascope::metadata::parse_hex_metadata;
use std::fs::{self, File};
use std::io::prelude::*;
use std::path::{Path, PathBuf};

pub use self::config::CollectorConfig;
pub use self::rpc::{MetadataHex, RpcClient, RuntimeVersion};

pub mod config;
pub mod rpc;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// Handler to save the collected information to disk.
pub struct Filesystem {
    path: PathBuf,
}

impl Filesystem {
    const STATE: &'static str = ".collection_state";

    pub fn new(config: &CollectorConfig) -> Self {
        Filesystem {
            path: config.location.join(&config.chain_name),
        }
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    fn write(&self, file_name: &str, content: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.path)?;

        let path = self.path.join(file_name);
        let mut file = File::create(&path)?;
        file.write_all(content)?;
        file.sync_all()?;

        Ok(path)
    }
    pub fn save_runtime_metadata(
        &self,
        version: &RuntimeVersion,
        metadata: &MetadataHex,
    ) -> Result<()> {
        // Save information about the runtime version.
        self.write(
            &format!("version_{}_{}.json", version.spec_name, version.spec_version),
            serde_json::to_string(version)?.as_bytes(),
        )?;

        // Save the metadata of the runtime.
        let path = self.write(
            &format!("metadata_{}_{}.hex", version.spec_name, version.spec_version),
            metadata.0.as_bytes(),
        )?;

        info!("saved runtime metadata to {}", path.display());
        Ok(())
    }
    pub fn read_last_state(&self) -> Result<Option<LatestInfo>> {
        let path = self.path.join(Self::STATE);

        if !path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Ok(Some(serde_json::from_str(&contents)?))
    }
    pub fn track_latest_state(&self, state: &LatestInfo) -> Result<()> {
        self.write(Self::STATE, serde_json::to_string_pretty(state)?.as_bytes())?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestInfo {
    pub spec_name: String,
    pub spec_version: u32,
    pub last_block: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Collected {
    /// A new runtime was saved.
    Saved(LatestInfo),
    /// The runtime did not change since the last collection.
    Unchanged(LatestInfo),
}

/// Take a snapshot of the runtime at the best block. Nothing is written
/// unless the runtime changed and its metadata can be decoded.
pub async fn collect(config: &CollectorConfig) -> Result<Collected> {
    let client = RpcClient::new(config.endpoint.as_str());
    let store = Filesystem::new(config);

    let last_block = client.latest_block().await?;
    let hash = client.block_hash(Some(last_block)).await?;
    let version = client.runtime_version(Some(&hash)).await?;

    let latest = LatestInfo {
        spec_name: version.spec_name.clone(),
        spec_version: version.spec_version,
        last_block,
    };

    if let Some(state) = store.read_last_state()? {
        if state.spec_name == latest.spec_name && state.spec_version == latest.spec_version {
            info!(
                "runtime {} {} unchanged at block {}",
                latest.spec_name, latest.spec_version, last_block
            );
            store.track_latest_state(&latest)?;
            return Ok(Collected::Unchanged(latest));
        }
    }

    let metadata = client.metadata(Some(&hash)).await?;
    let parsed = parse_hex_metadata(&metadata.0)?;
    info!(
        "collected metadata V{} of runtime {} {} at block {}",
        parsed.version_number(),
        latest.spec_name,
        latest.spec_version,
        last_block
    );

    store.save_runtime_metadata(&version, &metadata)?;
    store.track_latest_state(&latest)?;

    Ok(Collected::Saved(latest))
}
