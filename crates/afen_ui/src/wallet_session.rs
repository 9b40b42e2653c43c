use std::sync::Arc;

use afen_blockchain::{
    MobileWalletConnect, NATIVE_DECIMALS, NftContract, WalletConnector, format_units,
};
use afen_core::{MarketError, UserSession};
use afen_integrations::MetadataService;
use parking_lot::RwLock;
use tracing::{info, warn};

/// Decimal places shown for the native balance.
const BALANCE_PRECISION: usize = 4;

/// Which wallet capability the current session was established through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalletChannel {
    #[default]
    Desktop,
    Mobile,
}

#[derive(Default)]
struct SessionState {
    session: UserSession,
    channel: WalletChannel,
}

/// The connected account, shared by every component that needs it.
///
/// Cloning is cheap; all clones observe the same session. Only the
/// connect/disconnect actions below mutate it.
#[derive(Clone)]
pub struct WalletSession {
    state: Arc<RwLock<SessionState>>,
    connector: Arc<dyn WalletConnector>,
    mobile: Option<Arc<dyn MobileWalletConnect>>,
    profiles: Arc<dyn MetadataService>,
}

impl WalletSession {
    pub fn new(
        connector: Arc<dyn WalletConnector>,
        mobile: Option<Arc<dyn MobileWalletConnect>>,
        profiles: Arc<dyn MetadataService>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            connector,
            mobile,
            profiles,
        }
    }

    /// Copy of the current session.
    pub fn snapshot(&self) -> UserSession {
        self.state.read().session.clone()
    }

    pub fn address(&self) -> Option<String> {
        self.state.read().session.address.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().session.is_connected()
    }

    pub fn channel(&self) -> WalletChannel {
        self.state.read().channel
    }

    pub fn supports_mobile(&self) -> bool {
        self.mobile.is_some()
    }

    /// Desktop connect: request accounts, then load profile and balance.
    pub async fn connect_wallet(&self) -> Result<String, MarketError> {
        let address = self.connector.connect_wallet().await?;
        self.establish(&address, WalletChannel::Desktop).await;
        Ok(address)
    }

    /// Mobile connect: run the pairing handshake, then load profile and balance.
    pub async fn mobile_wallet_connect(&self) -> Result<String, MarketError> {
        let mobile = self
            .mobile
            .as_ref()
            .ok_or_else(|| MarketError::Config("no mobile wallet bridge configured".into()))?;
        let address = mobile.wallet_connect_init().await?;
        self.establish(&address, WalletChannel::Mobile).await;
        Ok(address)
    }

    /// Clear the session. A wallet that refuses to revoke access is logged;
    /// the local session is cleared regardless.
    pub async fn disconnect_wallet(&self) {
        let result = match self.active_mobile() {
            Some(mobile) => mobile.disconnect_wallet().await,
            None => self.connector.disconnect_wallet().await,
        };
        if let Err(e) = result {
            warn!("wallet disconnect failed: {e}");
        }
        *self.state.write() = SessionState::default();
        info!("wallet session cleared");
    }

    /// Refresh profile and balance for `address`. Results are dropped if the
    /// session moved to a different account in the meantime.
    pub async fn get_user(&self, address: &str) -> Result<(), MarketError> {
        let profile = self.profiles.get_user(address).await?;
        let balance = match self.active_mobile() {
            Some(mobile) => mobile.balance_of(address).await,
            None => self.connector.balance_of(address).await,
        };
        let balance = match balance {
            Ok(units) => Some(format_units(units, NATIVE_DECIMALS, BALANCE_PRECISION)),
            Err(e) => {
                warn!(%address, "balance lookup failed: {e}");
                None
            }
        };

        let mut state = self.state.write();
        if state.session.address.as_deref() != Some(address) {
            return Ok(());
        }
        state.session.user = profile;
        state.session.balance = balance;
        Ok(())
    }

    /// Contract binding signed by the connected address, through whichever
    /// wallet the session was established with.
    pub fn signed_contract(&self) -> Option<Arc<dyn NftContract>> {
        let address = self.address()?;
        Some(match self.active_mobile() {
            Some(mobile) => mobile.signed_contract(&address),
            None => self.connector.signed_contract(&address),
        })
    }

    fn active_mobile(&self) -> Option<&Arc<dyn MobileWalletConnect>> {
        match self.channel() {
            WalletChannel::Mobile => self.mobile.as_ref(),
            WalletChannel::Desktop => None,
        }
    }

    async fn establish(&self, address: &str, channel: WalletChannel) {
        *self.state.write() = SessionState {
            session: UserSession::connected(address),
            channel,
        };
        if let Err(e) = self.get_user(address).await {
            warn!(%address, "profile lookup failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afen_blockchain::{ContractError, TransactionHandle, WalletError};
    use afen_core::UserProfile;
    use afen_integrations::{CreateNftRequest, CreatedNft, MetadataError};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeWallet {
        disconnects: Mutex<u32>,
    }

    /// Paired phone wallet with its own balance.
    #[derive(Default)]
    struct FakeBridge {
        disconnects: Mutex<u32>,
    }

    struct NoopContract;

    #[async_trait]
    impl NftContract for NoopContract {
        async fn create_nft(
            &self,
            _: &str,
            _: u128,
            _: u128,
        ) -> Result<TransactionHandle, ContractError> {
            Ok(TransactionHandle { hash: "0x1".into() })
        }
    }

    #[async_trait]
    impl WalletConnector for FakeWallet {
        async fn connect_wallet(&self) -> Result<String, WalletError> {
            Ok("0xdesk".into())
        }

        async fn disconnect_wallet(&self) -> Result<(), WalletError> {
            *self.disconnects.lock() += 1;
            Err(WalletError::NoAccounts)
        }

        async fn balance_of(&self, _address: &str) -> Result<u128, WalletError> {
            Ok(421_000_000_000_000_000)
        }

        fn signed_contract(&self, _signer: &str) -> Arc<dyn NftContract> {
            Arc::new(NoopContract)
        }
    }

    #[async_trait]
    impl WalletConnector for FakeBridge {
        async fn connect_wallet(&self) -> Result<String, WalletError> {
            Ok("0xmobile".into())
        }

        async fn disconnect_wallet(&self) -> Result<(), WalletError> {
            *self.disconnects.lock() += 1;
            Ok(())
        }

        async fn balance_of(&self, _address: &str) -> Result<u128, WalletError> {
            Ok(2_000_000_000_000_000_000)
        }

        fn signed_contract(&self, _signer: &str) -> Arc<dyn NftContract> {
            Arc::new(NoopContract)
        }
    }

    #[async_trait]
    impl MobileWalletConnect for FakeBridge {
        async fn wallet_connect_init(&self) -> Result<String, WalletError> {
            Ok("0xmobile".into())
        }
    }

    struct FakeProfiles {
        fail: bool,
    }

    #[async_trait]
    impl MetadataService for FakeProfiles {
        async fn create_nft(&self, _: CreateNftRequest) -> Result<CreatedNft, MetadataError> {
            unreachable!("profile tests never upload")
        }

        async fn get_user(&self, address: &str) -> Result<Option<UserProfile>, MetadataError> {
            if self.fail {
                return Err(MetadataError::Network("offline".into()));
            }
            Ok(Some(UserProfile {
                id: format!("id-{address}"),
                display_name: Some("Ada".into()),
                avatar_url: None,
                balance: None,
            }))
        }
    }

    fn session_with_bridge(
        fail_profiles: bool,
        with_mobile: bool,
    ) -> (WalletSession, Arc<FakeWallet>, Arc<FakeBridge>) {
        let wallet = Arc::new(FakeWallet::default());
        let bridge = Arc::new(FakeBridge::default());
        let mobile: Option<Arc<dyn MobileWalletConnect>> = if with_mobile {
            Some(bridge.clone())
        } else {
            None
        };
        let session = WalletSession::new(
            wallet.clone(),
            mobile,
            Arc::new(FakeProfiles { fail: fail_profiles }),
        );
        (session, wallet, bridge)
    }

    fn session(fail_profiles: bool, with_mobile: bool) -> (WalletSession, Arc<FakeWallet>) {
        let (session, wallet, _) = session_with_bridge(fail_profiles, with_mobile);
        (session, wallet)
    }

    #[tokio::test]
    async fn connect_loads_profile_and_balance() {
        let (session, _) = session(false, false);
        assert!(!session.is_connected());
        assert!(session.signed_contract().is_none());

        let address = session.connect_wallet().await.unwrap();
        assert_eq!(address, "0xdesk");

        let snap = session.snapshot();
        assert_eq!(snap.address.as_deref(), Some("0xdesk"));
        assert_eq!(snap.user_id(), Some("id-0xdesk"));
        assert_eq!(snap.balance.as_deref(), Some("0.4210"));
        assert!(session.signed_contract().is_some());
    }

    #[tokio::test]
    async fn profile_failure_keeps_wallet_connected() {
        let (session, _) = session(true, false);
        session.connect_wallet().await.unwrap();
        let snap = session.snapshot();
        assert!(snap.is_connected());
        assert!(snap.user.is_none());
    }

    #[tokio::test]
    async fn mobile_connect_uses_bridge() {
        let (session, wallet, bridge) = session_with_bridge(false, true);
        assert!(session.supports_mobile());
        assert_eq!(session.mobile_wallet_connect().await.unwrap(), "0xmobile");
        assert_eq!(session.channel(), WalletChannel::Mobile);

        let snap = session.snapshot();
        assert_eq!(snap.user_id(), Some("id-0xmobile"));
        assert_eq!(snap.balance.as_deref(), Some("2.0000"));

        session.disconnect_wallet().await;
        assert_eq!(*bridge.disconnects.lock(), 1);
        assert_eq!(*wallet.disconnects.lock(), 0);
        assert_eq!(session.channel(), WalletChannel::Desktop);
    }

    #[tokio::test]
    async fn mobile_connect_without_bridge_is_config_error() {
        let (session, _) = session(false, false);
        let err = session.mobile_wallet_connect().await.unwrap_err();
        assert!(matches!(err, MarketError::Config(_)));
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn disconnect_clears_even_when_wallet_errors() {
        let (session, wallet) = session(false, false);
        session.connect_wallet().await.unwrap();

        session.disconnect_wallet().await;
        assert_eq!(*wallet.disconnects.lock(), 1);
        assert_eq!(session.snapshot(), UserSession::default());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let (session, _) = session(false, false);
        let other = session.clone();
        session.connect_wallet().await.unwrap();
        assert!(other.is_connected());
    }

    #[tokio::test]
    async fn stale_profile_is_discarded() {
        let (session, _) = session(false, false);
        session.connect_wallet().await.unwrap();
        session.get_user("0xsomeone-else").await.unwrap();
        assert_eq!(session.snapshot().user_id(), Some("id-0xdesk"));
    }
}
