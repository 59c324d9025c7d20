//! The boundary between metadata resolution and a node's storage.
//!
//! A [`StateApi`] implementation only has to answer `state_getStorage`
//! requests. Decoding the response into raw bytes, SCALE values or account
//! information is shared by all transports.

use crate::common::AccountInfo;
use crate::metadata::{StorageKey, StorageMetadataExt};
use crate::{Error, Result};
use parity_scale_codec::Decode;

pub type BlockHash = [u8; 32];

/// Hex representation with `0x` prefix, as expected by the JSON-RPC API.
pub fn block_hash_to_hex(hash: &BlockHash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Convert the hex value returned by `state_getStorage`. A missing value, an
/// empty string and a bare `0x` all mean the key holds no value.
pub fn decode_storage_response(resp: Option<&str>) -> Result<Option<Vec<u8>>> {
    let hex_str = match resp {
        Some(hex_str) => hex_str.strip_prefix("0x").unwrap_or(hex_str),
        None => return Ok(None),
    };

    if hex_str.is_empty() {
        return Ok(None);
    }

    Ok(Some(hex::decode(hex_str)?))
}

/// Build the `System.Account` key of the given account.
pub fn account_storage_key<M: StorageMetadataExt>(
    metadata: &M,
    account_id: &[u8; 32],
) -> Result<StorageKey> {
    let entry = metadata.find_storage_entry("System", "Account")?;
    Ok(entry.storage_key(&[account_id])?)
}

/// Read access to the storage of a node.
#[allow(async_fn_in_trait)]
pub trait StateApi {
    /// Fetch the hex encoded value stored under `key`, at the given block or
    /// at the best block if `None`.
    async fn get_storage_hex(
        &self,
        key: &StorageKey,
        at: Option<BlockHash>,
    ) -> Result<Option<String>>;

    async fn get_storage_raw(&self, key: &StorageKey, at: BlockHash) -> Result<Option<Vec<u8>>> {
        let resp = self.get_storage_hex(key, Some(at)).await?;
        decode_storage_response(resp.as_deref())
    }
    async fn get_storage_raw_latest(&self, key: &StorageKey) -> Result<Option<Vec<u8>>> {
        let resp = self.get_storage_hex(key, None).await?;
        decode_storage_response(resp.as_deref())
    }
    async fn get_storage<T: Decode>(&self, key: &StorageKey, at: BlockHash) -> Result<Option<T>> {
        match self.get_storage_raw(key, at).await? {
            Some(raw) => Ok(Some(T::decode(&mut raw.as_slice())?)),
            None => Ok(None),
        }
    }
    async fn get_storage_latest<T: Decode>(&self, key: &StorageKey) -> Result<Option<T>> {
        match self.get_storage_raw_latest(key).await? {
            Some(raw) => Ok(Some(T::decode(&mut raw.as_slice())?)),
            None => Ok(None),
        }
    }
    /// Fetch and decode the `System.Account` value stored under `key`,
    /// whatever layout the runtime uses.
    async fn get_account_info(
        &self,
        key: &StorageKey,
        at: Option<BlockHash>,
    ) -> Result<AccountInfo> {
        let resp = self.get_storage_hex(key, at).await?;

        match decode_storage_response(resp.as_deref())? {
            Some(raw) => AccountInfo::from_raw(&raw),
            None => {
                debug!("no account info stored under {}", key);
                Err(Error::EmptyStorage(key.to_hex()))
            }
        }
    }
}
