use std::sync::Arc;

use afen_core::MarketError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::rpc::{RpcClient, RpcError};

/// `keccak256("create_nft(string,uint256,uint256)")[..4]`
pub const CREATE_NFT_SELECTOR: [u8; 4] = [0x03, 0x3c, 0x1d, 0xbb];

/// EIP-1193 "user rejected request".
const USER_REJECTED: i64 = 4001;

const WORD: usize = 32;

/// A submitted (not necessarily mined) transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
    pub hash: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("Wallet rejected the transaction: {0}")]
    Rejected(String),

    #[error("Contract call reverted: {0}")]
    Reverted(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<RpcError> for ContractError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Rpc { code, message } if code == USER_REJECTED => Self::Rejected(message),
            RpcError::Rpc { message, .. } => Self::Reverted(message),
            RpcError::InvalidResponse(msg) => Self::InvalidResponse(msg),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<ContractError> for MarketError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::Transport(msg) => MarketError::Network(msg),
            other => MarketError::ContractCall(other.to_string()),
        }
    }
}

/// The marketplace NFT contract, bound to the connected signer.
#[async_trait]
pub trait NftContract: Send + Sync {
    /// Mint a token pointing at `file_hash`, listed at `price_a` quote-token
    /// units and `price_b` native units. Returns once the wallet has accepted
    /// the transaction for submission.
    async fn create_nft(
        &self,
        file_hash: &str,
        price_a: u128,
        price_b: u128,
    ) -> Result<TransactionHandle, ContractError>;
}

/// ABI-encode a `create_nft(string,uint256,uint256)` call.
pub fn encode_create_nft(file_hash: &str, price_a: u128, price_b: u128) -> Vec<u8> {
    let bytes = file_hash.as_bytes();
    let padded_len = bytes.len().div_ceil(WORD) * WORD;

    let mut data = Vec::with_capacity(4 + 4 * WORD + padded_len);
    data.extend_from_slice(&CREATE_NFT_SELECTOR);
    // Head: offset of the dynamic string, then the two static words.
    data.extend_from_slice(&uint_word(3 * WORD as u128));
    data.extend_from_slice(&uint_word(price_a));
    data.extend_from_slice(&uint_word(price_b));
    // Tail: string length + right-padded bytes.
    data.extend_from_slice(&uint_word(bytes.len() as u128));
    data.extend_from_slice(bytes);
    data.resize(data.len() + (padded_len - bytes.len()), 0);
    data
}

fn uint_word(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// [`NftContract`] that sends `eth_sendTransaction` through the wallet's RPC
/// endpoint; the wallet signs with `signer`.
pub struct JsonRpcNftContract {
    rpc: Arc<RpcClient>,
    contract_address: String,
    signer: String,
}

impl JsonRpcNftContract {
    pub fn new(
        rpc: Arc<RpcClient>,
        contract_address: impl Into<String>,
        signer: impl Into<String>,
    ) -> Self {
        Self {
            rpc,
            contract_address: contract_address.into(),
            signer: signer.into(),
        }
    }

    pub fn signer(&self) -> &str {
        &self.signer
    }
}

#[async_trait]
impl NftContract for JsonRpcNftContract {
    async fn create_nft(
        &self,
        file_hash: &str,
        price_a: u128,
        price_b: u128,
    ) -> Result<TransactionHandle, ContractError> {
        let data = encode_create_nft(file_hash, price_a, price_b);
        let tx = json!({
            "from": self.signer,
            "to": self.contract_address,
            "data": format!("0x{}", hex::encode(&data)),
        });

        debug!(
            contract = %self.contract_address,
            signer = %self.signer,
            file_hash,
            "create_nft: requesting signature"
        );

        let hash: String = self.rpc.call("eth_sendTransaction", json!([tx])).await?;
        info!(tx_hash = %hash, file_hash, "create_nft submitted");
        Ok(TransactionHandle { hash })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcConfig;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CONTRACT: &str = "0x1111111111111111111111111111111111111111";
    const SIGNER: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn encoding_layout() {
        let data = encode_create_nft("abc123", 1_500, 20);

        assert_eq!(&data[..4], &CREATE_NFT_SELECTOR);
        assert_eq!(data.len(), 4 + 5 * WORD);
        // string offset
        assert_eq!(data[4 + WORD - 1], 0x60);
        // price words
        assert_eq!(&data[4 + WORD..4 + 2 * WORD], &uint_word(1_500));
        assert_eq!(&data[4 + 2 * WORD..4 + 3 * WORD], &uint_word(20));
        // string length then bytes, zero padded
        assert_eq!(data[4 + 4 * WORD - 1], 6);
        assert_eq!(&data[4 + 4 * WORD..4 + 4 * WORD + 6], b"abc123");
        assert!(data[4 + 4 * WORD + 6..].iter().all(|b| *b == 0));
    }

    #[test]
    fn encoding_pads_long_hashes_to_word_boundary() {
        let hash = "Qm".to_string() + &"x".repeat(44); // 46 bytes
        let data = encode_create_nft(&hash, 0, 0);
        assert_eq!(data.len(), 4 + 4 * WORD + 2 * WORD);
    }

    #[test]
    fn uint_word_is_big_endian() {
        let word = uint_word(0x0102);
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        assert!(word[..30].iter().all(|b| *b == 0));
    }

    #[test]
    fn rpc_errors_classify() {
        let rejected: ContractError = RpcError::Rpc {
            code: 4001,
            message: "User denied".into(),
        }
        .into();
        assert!(matches!(rejected, ContractError::Rejected(_)));

        let reverted: ContractError = RpcError::Rpc {
            code: 3,
            message: "execution reverted".into(),
        }
        .into();
        assert!(matches!(reverted, ContractError::Reverted(_)));

        let transport: ContractError = RpcError::Network("timeout".into()).into();
        assert!(matches!(transport, ContractError::Transport(_)));
    }

    #[tokio::test]
    async fn create_nft_sends_transaction_from_signer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "method": "eth_sendTransaction",
                "params": [{ "from": SIGNER, "to": CONTRACT }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1, "result": "0xdeadbeef"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rpc = Arc::new(RpcClient::new(&RpcConfig::new(server.uri())).unwrap());
        let contract = JsonRpcNftContract::new(rpc, CONTRACT, SIGNER);
        let handle = contract.create_nft("abc123", 1, 2).await.unwrap();
        assert_eq!(handle.hash, "0xdeadbeef");
    }

    #[tokio::test]
    async fn create_nft_maps_user_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0", "id": 1,
                "error": { "code": 4001, "message": "User denied transaction signature." }
            })))
            .mount(&server)
            .await;

        let rpc = Arc::new(RpcClient::new(&RpcConfig::new(server.uri())).unwrap());
        let contract = JsonRpcNftContract::new(rpc, CONTRACT, SIGNER);
        let err = contract.create_nft("abc123", 1, 2).await.unwrap_err();
        assert!(matches!(err, ContractError::Rejected(_)));
    }
}
