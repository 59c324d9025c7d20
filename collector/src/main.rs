#[macro_use]
extern crate log;

use anyhow::Context;
use clap::{Parser, Subcommand};
use collector::{collect, Collected, CollectorConfig, Result, RpcClient};
use metascope::metadata::*;
use metascope::state::{account_storage_key, StateApi};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "metadata-collector", version, about = "Collect and query Substrate runtime metadata")]
struct Cli {
    /// Path to the YAML configuration.
    #[arg(short, long, global = true, default_value = "config.yml")]
    config: PathBuf,
    /// Read the metadata from a hex file instead of the configured node.
    #[arg(short, long, global = true)]
    metadata: Option<PathBuf>,
    /// Node endpoint, overrides the one in the configuration.
    #[arg(short, long, global = true)]
    endpoint: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save the metadata of the current runtime, if it changed.
    Collect,
    /// Resolve the call index of `Module.call`.
    CallIndex { path: String },
    /// Resolve a call index, e.g. `0x0503`, into its module and call names.
    CallName { index: CallIndex },
    /// Resolve an event id, e.g. `0x0502`, into its module and event names.
    Event { id: EventId },
    /// Build the storage key of an entry from hex encoded SCALE keys.
    StorageKey {
        module: String,
        entry: String,
        keys: Vec<String>,
    },
    /// Show the type and value of a module constant.
    Constant { module: String, name: String },
    /// Fetch the account information of a 32 byte account id.
    Account {
        account_id: String,
        /// Block hash to query at, the best block if absent.
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(Serialize)]
struct Names<'a> {
    module: &'a str,
    name: &'a str,
}

impl Cli {
    fn endpoint(&self) -> Result<String> {
        match &self.endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Ok(CollectorConfig::from_file(&self.config)
                .with_context(|| format!("failed to read config {}", self.config.display()))?
                .endpoint),
        }
    }
    async fn load_metadata(&self) -> Result<MetadataVersion> {
        let content = match &self.metadata {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read metadata {}", path.display()))?,
            None => RpcClient::new(self.endpoint()?).metadata(None).await?.0,
        };

        Ok(parse_hex_metadata(content)?)
    }
}

fn decode_hex<const N: usize>(value: &str) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    hex::decode_to_slice(value.trim_start_matches("0x"), &mut out)
        .with_context(|| format!("expected {} hex encoded bytes, got {:?}", N, value))?;
    Ok(out)
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Collect => {
            let mut config = CollectorConfig::from_file(&cli.config)
                .with_context(|| format!("failed to read config {}", cli.config.display()))?;
            if let Some(endpoint) = &cli.endpoint {
                config.endpoint = endpoint.clone();
            }

            match collect(&config).await? {
                Collected::Saved(latest) => print(&latest)?,
                Collected::Unchanged(latest) => {
                    info!("nothing to collect");
                    print(&latest)?
                }
            }
        }
        Command::CallIndex { path } => {
            let metadata = cli.load_metadata().await?;
            print(&metadata.find_call(path)?)?;
        }
        Command::CallName { index } => {
            let metadata = cli.load_metadata().await?;
            let (module, name) = metadata.find_call_names(*index)?;
            print(&Names { module, name })?;
        }
        Command::Event { id } => {
            let metadata = cli.load_metadata().await?;
            let (module, name) = metadata.find_event_names(*id)?;
            print(&Names { module, name })?;
        }
        Command::StorageKey {
            module,
            entry,
            keys,
        } => {
            let metadata = cli.load_metadata().await?;
            let keys = keys
                .iter()
                .map(|key| hex::decode(key.trim_start_matches("0x")))
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let entry = metadata.find_storage_entry(module, entry)?;
            print(&entry.storage_key(&keys)?)?;
        }
        Command::Constant { module, name } => {
            let metadata = cli.load_metadata().await?;
            print(&metadata.get_constant(module, name)?)?;
        }
        Command::Account { account_id, at } => {
            let account_id = decode_hex::<32>(account_id)?;
            let at = at.as_deref().map(decode_hex::<32>).transpose()?;

            let metadata = cli.load_metadata().await?;
            let key = account_storage_key(&metadata, &account_id)?;
            debug!("querying account info under {}", key);

            let client = RpcClient::new(cli.endpoint()?);
            print(&client.get_account_info(&key, at).await?)?;
        }
    }

    Ok(())
}
