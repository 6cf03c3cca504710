//! JSON-RPC contract client
//!
//! Views go through `eth_call` against the `latest` block. Writes go through
//! `eth_sendTransaction`, so the node (or the wallet behind it) holds the
//! signing key for the `from` account.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::abi;
use super::{
    Address, CallOutput, ChainError, ContractCall, ContractClient, ContractTransaction,
    OutputKind, TxHash,
};

/// Configuration for the JSON-RPC client
#[derive(Debug, Clone)]
pub struct JsonRpcConfig {
    /// Node endpoint
    pub rpc_url: String,
    /// Registry contract address
    pub contract: Address,
    /// Per-request timeout
    pub timeout: Duration,
}

#[derive(Serialize)]
struct RpcRequest<'a, P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct CallObject {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    to: String,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

/// Registry contract over an EVM JSON-RPC node
pub struct JsonRpcContractClient {
    config: JsonRpcConfig,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcContractClient {
    pub fn new(config: JsonRpcConfig) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        Ok(Self {
            config,
            http,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &JsonRpcConfig {
        &self.config
    }

    async fn request<P: Serialize + Send>(
        &self,
        method: &str,
        params: P,
    ) -> Result<serde_json::Value, ChainError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .http
            .post(&self.config.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(e.to_string()))?;

        let status = response.status();
        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Transport(format!("HTTP {}: {}", status, e)))?;

        if let Some(error) = parsed.error {
            return Err(rpc_error(error));
        }

        parsed
            .result
            .ok_or_else(|| ChainError::Transport(format!("{} returned no result", method)))
    }
}

/// Map a JSON-RPC error object, pulling out revert reasons where present
fn rpc_error(error: RpcErrorObject) -> ChainError {
    let revert_data = error
        .data
        .as_ref()
        .and_then(|d| d.as_str())
        .and_then(|s| decode_hex(s).ok());

    if let Some(reason) = revert_data.as_deref().and_then(abi::decode_revert_reason) {
        return ChainError::Reverted(reason);
    }
    if error.code == 3 || error.message.contains("execution reverted") {
        return ChainError::Reverted(error.message);
    }
    ChainError::Rpc {
        code: error.code,
        message: error.message,
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, ChainError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| ChainError::Decode(format!("invalid hex in response: {}", e)))
}

/// Decode `eth_call` return data according to the call's output shape
pub fn decode_output(call: &ContractCall, data: &[u8]) -> Result<CallOutput, ChainError> {
    match call.output_kind() {
        OutputKind::Profile => abi::decode_profile(data).map(CallOutput::Profile),
        OutputKind::Addresses => abi::decode_address_array(data).map(CallOutput::Addresses),
        OutputKind::Uint => abi::decode_uint(data).map(CallOutput::Uint),
        OutputKind::Address => abi::decode_address(data).map(CallOutput::Address),
    }
}

#[async_trait::async_trait]
impl ContractClient for JsonRpcContractClient {
    async fn call(&self, call: ContractCall) -> Result<CallOutput, ChainError> {
        debug!(function = call.name(), "eth_call");

        let params = (
            CallObject {
                from: None,
                to: self.config.contract.to_hex(),
                data: format!("0x{}", hex::encode(call.calldata())),
                value: None,
            },
            "latest",
        );

        let result = self.request("eth_call", params).await.map_err(|e| {
            warn!("Error reading contract function {}: {}", call.name(), e);
            e
        })?;

        let hex_data = result
            .as_str()
            .ok_or_else(|| ChainError::Decode("eth_call result is not a string".to_string()))?;
        let data = decode_hex(hex_data)?;

        // Calls to an address with no code return empty data
        if data.is_empty() {
            return Err(ChainError::Reverted(format!(
                "{} returned no data (is the contract deployed at {}?)",
                call.name(),
                self.config.contract
            )));
        }

        decode_output(&call, &data)
    }

    async fn transact(&self, tx: ContractTransaction) -> Result<TxHash, ChainError> {
        debug!(function = tx.call.name(), from = %tx.from, value = tx.value, "eth_sendTransaction");

        let params = [CallObject {
            from: Some(tx.from.to_hex()),
            to: self.config.contract.to_hex(),
            data: format!("0x{}", hex::encode(tx.call.calldata())),
            value: Some(format!("0x{:x}", tx.value)),
        }];

        let result = self.request("eth_sendTransaction", params).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ChainError::Decode("transaction hash is not a string".to_string()))
    }
}
