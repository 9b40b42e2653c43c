use std::sync::Arc;

use afen_core::MarketError;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::contract::{JsonRpcNftContract, NftContract};
use crate::rpc::{METHOD_NOT_FOUND, RpcClient, RpcError};
use crate::units::{UnitsError, parse_hex_quantity};

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Connection request rejected: {0}")]
    Rejected(String),

    #[error("Wallet RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Invalid balance: {0}")]
    Balance(#[from] UnitsError),
}

impl From<WalletError> for MarketError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rpc(rpc) => rpc.into(),
            WalletError::NoAccounts | WalletError::Rejected(_) => MarketError::Unauthenticated,
            WalletError::Balance(e) => MarketError::Internal(e.to_string()),
        }
    }
}

/// Desktop wallet capability (browser-extension style, EIP-1193).
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Ask the wallet for account access; returns the selected address.
    async fn connect_wallet(&self) -> Result<String, WalletError>;

    /// Drop account access. Wallets that cannot revoke are treated as done.
    async fn disconnect_wallet(&self) -> Result<(), WalletError>;

    /// Native balance of `address` in base units.
    async fn balance_of(&self, address: &str) -> Result<u128, WalletError>;

    /// Contract binding whose transactions are signed by `signer`.
    fn signed_contract(&self, signer: &str) -> Arc<dyn NftContract>;
}

/// Mobile wallet pairing (WalletConnect-style bridge). Once paired, the
/// bridge serves balance, disconnect and signing like a desktop wallet.
#[async_trait]
pub trait MobileWalletConnect: WalletConnector {
    /// Start the pairing handshake and wait for the wallet to approve;
    /// returns the approved address.
    async fn wallet_connect_init(&self) -> Result<String, WalletError>;
}

/// Wallet reached through a JSON-RPC endpoint that holds the keys (an
/// injected provider bridge, a WalletConnect relay, or a dev node).
pub struct RpcWallet {
    rpc: Arc<RpcClient>,
    contract_address: String,
}

impl RpcWallet {
    pub fn new(rpc: Arc<RpcClient>, contract_address: impl Into<String>) -> Self {
        Self {
            rpc,
            contract_address: contract_address.into(),
        }
    }

    async fn request_accounts(&self) -> Result<String, WalletError> {
        let accounts: Vec<String> = self
            .rpc
            .call("eth_requestAccounts", json!([]))
            .await
            .map_err(|e| match e {
                RpcError::Rpc { code: 4001, message } => WalletError::Rejected(message),
                other => WalletError::Rpc(other),
            })?;
        let address = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;
        info!(%address, endpoint = %self.rpc.url(), "wallet connected");
        Ok(address)
    }
}

#[async_trait]
impl WalletConnector for RpcWallet {
    async fn connect_wallet(&self) -> Result<String, WalletError> {
        self.request_accounts().await
    }

    async fn disconnect_wallet(&self) -> Result<(), WalletError> {
        let result = self
            .rpc
            .call::<serde_json::Value>("wallet_revokePermissions", json!([{ "eth_accounts": {} }]))
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(RpcError::Rpc { code, .. }) if code == METHOD_NOT_FOUND => {
                debug!("wallet does not support wallet_revokePermissions");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn balance_of(&self, address: &str) -> Result<u128, WalletError> {
        let quantity: String = self
            .rpc
            .call("eth_getBalance", json!([address, "latest"]))
            .await?;
        Ok(parse_hex_quantity(&quantity)?)
    }

    fn signed_contract(&self, signer: &str) -> Arc<dyn NftContract> {
        Arc::new(JsonRpcNftContract::new(
            Arc::clone(&self.rpc),
            self.contract_address.clone(),
            signer,
        ))
    }
}

#[async_trait]
impl MobileWalletConnect for RpcWallet {
    async fn wallet_connect_init(&self) -> Result<String, WalletError> {
        debug!(endpoint = %self.rpc.url(), "starting mobile wallet pairing");
        self.request_accounts().await
    }
}
