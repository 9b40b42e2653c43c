// Wallet connection + NFT contract binding over Ethereum JSON-RPC

pub mod contract;
pub mod rpc;
pub mod units;
pub mod wallet;

// Re-export primary types for convenient access.
pub use contract::{
    CREATE_NFT_SELECTOR, ContractError, JsonRpcNftContract, NftContract, TransactionHandle,
    encode_create_nft,
};
pub use rpc::{RpcClient, RpcConfig, RpcError};
pub use units::{NATIVE_DECIMALS, UnitsError, format_units, parse_hex_quantity, parse_units};
pub use wallet::{MobileWalletConnect, RpcWallet, WalletConnector, WalletError};
