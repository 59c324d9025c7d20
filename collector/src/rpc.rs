//! JSON-RPC 2.0 over HTTP, as served by Substrate nodes.

use crate::Result;
use anyhow::anyhow;
use metascope::metadata::StorageKey;
use metascope::state::{block_hash_to_hex, BlockHash, StateApi};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest<'a, T> {
    pub id: i64,
    pub jsonrpc: &'a str,
    pub method: &'a str,
    pub params: T,
}

impl<'a, T> RpcRequest<'a, T> {
    fn new(method: RpcMethod, params: T) -> Self {
        RpcRequest {
            id: 1,
            jsonrpc: "2.0",
            method: method.as_str(),
            params,
        }
    }
}

/// The `result` is absent on failure and `null` for missing storage values,
/// so it is kept untyped until the error has been checked.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Value,
    pub error: Option<RpcError>,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub enum RpcMethod {
    Header,
    BlockHash,
    RuntimeVersion,
    Metadata,
    Storage,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RpcMethod::Header => "chain_getHeader",
            RpcMethod::BlockHash => "chain_getBlockHash",
            RpcMethod::RuntimeVersion => "state_getRuntimeVersion",
            RpcMethod::Metadata => "state_getMetadata",
            RpcMethod::Storage => "state_getStorage",
        }
    }
}

/// Response when calling `chain_getHeader`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub digest: Value,
    #[serde(rename = "extrinsicsRoot")]
    pub extrinsics_root: String,
    pub number: String,
    #[serde(rename = "parentHash")]
    pub parent_hash: String,
    #[serde(rename = "stateRoot")]
    pub state_root: String,
}

/// Response when calling `state_getRuntimeVersion`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeVersion {
    pub apis: Vec<(String, u32)>,
    #[serde(rename = "authoringVersion")]
    pub authoring_version: u32,
    #[serde(rename = "implName")]
    pub impl_name: String,
    #[serde(rename = "implVersion")]
    pub impl_version: u32,
    #[serde(rename = "specName")]
    pub spec_name: String,
    #[serde(rename = "specVersion")]
    pub spec_version: u32,
    #[serde(rename = "transactionVersion", default)]
    pub transaction_version: u32,
}

/// Response when calling `state_getMetadata`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataHex(pub String);

/// A single node endpoint. Every call is one request, failures are handed to
/// the caller.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: String,
}

impl RpcClient {
    pub fn new<T: Into<String>>(endpoint: T) -> Self {
        RpcClient {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
    /// Convenience function for executing a RPC call.
    pub async fn request<B: Serialize, R: DeserializeOwned>(
        &self,
        method: RpcMethod,
        params: B,
    ) -> Result<R> {
        debug!("sending {} to {}", method.as_str(), self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&RpcRequest::new(method, params))
            .send()
            .await?
            .error_for_status()?
            .json::<RpcResponse>()
            .await?;

        if let Some(err) = resp.error {
            return Err(anyhow!(
                "{} failed with code {}: {}",
                method.as_str(),
                err.code,
                err.message
            ));
        }

        Ok(serde_json::from_value(resp.result)?)
    }
    /// Fetch the number of the best block.
    pub async fn latest_block(&self) -> Result<u64> {
        let header: Header = self.request(RpcMethod::Header, json!([])).await?;
        let number = header.number.trim_start_matches("0x");

        Ok(u64::from_str_radix(number, 16)?)
    }
    /// Fetch the hash of the given block, or of the best block if `None`.
    pub async fn block_hash(&self, number: Option<u64>) -> Result<String> {
        self.request(RpcMethod::BlockHash, json!([number])).await
    }
    pub async fn runtime_version(&self, at: Option<&str>) -> Result<RuntimeVersion> {
        self.request(RpcMethod::RuntimeVersion, json!([at])).await
    }
    pub async fn metadata(&self, at: Option<&str>) -> Result<MetadataHex> {
        self.request(RpcMethod::Metadata, json!([at])).await
    }
}

impl StateApi for RpcClient {
    async fn get_storage_hex(
        &self,
        key: &StorageKey,
        at: Option<BlockHash>,
    ) -> metascope::Result<Option<String>> {
        let at = at.as_ref().map(block_hash_to_hex);

        self.request(RpcMethod::Storage, json!([key.to_hex(), at]))
            .await
            .map_err(|err| metascope::Error::Transport(err.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn rpc_result(result: Value) -> String {
        json!({ "jsonrpc": "2.0", "result": result, "id": 1 }).to_string()
    }

    #[tokio::test]
    async fn latest_block_is_hex_encoded() -> Result<()> {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({ "method": "chain_getHeader" })))
            .with_header("content-type", "application/json")
            .with_body(rpc_result(json!({
                "digest": { "logs": [] },
                "extrinsicsRoot": "0x00",
                "number": "0x1a2b",
                "parentHash": "0x00",
                "stateRoot": "0x00",
            })))
            .create_async()
            .await;

        let client = RpcClient::new(server.url());
        assert_eq!(client.latest_block().await?, 0x1a2b);

        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn runtime_version_at_block() -> Result<()> {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "state_getRuntimeVersion",
                "params": ["0xabcd"],
            })))
            .with_body(rpc_result(json!({
                "apis": [["0xdf6acb689907609b", 3]],
                "authoringVersion": 0,
                "implName": "parity-polkadot",
                "implVersion": 0,
                "specName": "polkadot",
                "specVersion": 9110,
                "transactionVersion": 8,
            })))
            .create_async()
            .await;

        let client = RpcClient::new(server.url());
        let version = client.runtime_version(Some("0xabcd")).await?;

        assert_eq!(version.spec_name, "polkadot");
        assert_eq!(version.spec_version, 9110);
        assert_eq!(version.apis[0].1, 3);
        Ok(())
    }

    #[tokio::test]
    async fn rpc_errors_are_reported() {
        let mut server = mockito::Server::new_async().await;

        let _mock = server
            .mock("POST", "/")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "error": { "code": -32601, "message": "Method not found" },
                    "id": 1,
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = RpcClient::new(server.url());
        let err = client.metadata(None).await.unwrap_err();

        assert!(err.to_string().contains("Method not found"));
    }

    #[tokio::test]
    async fn storage_through_state_api() {
        let mut server = mockito::Server::new_async().await;

        let _missing = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "state_getStorage",
                "params": ["0x0102", null],
            })))
            .with_body(rpc_result(Value::Null))
            .create_async()
            .await;
        let _present = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "state_getStorage",
                "params": ["0x0304", format!("0x{}", "11".repeat(32))],
            })))
            .with_body(rpc_result(json!("0x2a000000")))
            .create_async()
            .await;

        let client = RpcClient::new(server.url());

        let missing = client
            .get_storage_raw_latest(&StorageKey(vec![1, 2]))
            .await
            .unwrap();
        assert_eq!(missing, None);

        let value: Option<u32> = client
            .get_storage(&StorageKey(vec![3, 4]), [0x11; 32])
            .await
            .unwrap();
        assert_eq!(value, Some(42));
    }

    #[tokio::test]
    async fn unreachable_node_is_a_transport_error() {
        let client = RpcClient::new("http://127.0.0.1:1");

        assert!(matches!(
            client.get_storage_raw_latest(&StorageKey(vec![1])).await,
            Err(metascope::Error::Transport(_))
        ));
    }
}
