use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Errors from the chain RPC endpoint
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("RPC request failed: {0}")]
    RequestFailed(String),

    #[error("RPC error response: {0}")]
    RpcError(String),

    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),
}

/// Live activation state of one stake account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StakeActivation {
    /// "active", "inactive", "activating", "deactivating" or "unknown"
    pub state: String,

    /// Lamports currently earning rewards
    pub active_lamports: u64,
}

impl StakeActivation {
    /// Placeholder used when the RPC lookup for an account fails;
    /// the listing degrades per account instead of failing as a whole
    pub fn unknown() -> Self {
        Self {
            state: "unknown".to_string(),
            active_lamports: 0,
        }
    }
}

/// Chain status queries, kept as narrow as the service needs
///
/// The server never signs or submits anything; this is a read-only window
/// onto delegation state.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    async fn stake_activation(&self, stake_account_pubkey: &str) -> Result<StakeActivation, ChainError>;
}

/// JSON-RPC implementation against a configured chain endpoint
pub struct RpcChainClient {
    client: reqwest::Client,
    rpc_url: String,
}

impl RpcChainClient {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url,
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for RpcChainClient {
    async fn stake_activation(&self, stake_account_pubkey: &str) -> Result<StakeActivation, ChainError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getStakeActivation",
            "params": [stake_account_pubkey],
        });

        let response: serde_json::Value = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainError::RequestFailed(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChainError::MalformedResponse(e.to_string()))?;

        if let Some(error) = response.get("error") {
            return Err(ChainError::RpcError(error.to_string()));
        }

        let result = response
            .get("result")
            .ok_or_else(|| ChainError::MalformedResponse("missing result".to_string()))?;

        let state = result
            .get("state")
            .and_then(|s| s.as_str())
            .ok_or_else(|| ChainError::MalformedResponse("missing state".to_string()))?
            .to_string();

        let active_lamports = result.get("active").and_then(|a| a.as_u64()).unwrap_or(0);

        Ok(StakeActivation {
            state,
            active_lamports,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_activation_placeholder() {
        let activation = StakeActivation::unknown();
        assert_eq!(activation.state, "unknown");
        assert_eq!(activation.active_lamports, 0);
    }
}
