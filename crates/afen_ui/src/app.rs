use std::path::Path;
use std::sync::Arc;

use afen_blockchain::{MobileWalletConnect, RpcClient, RpcConfig, RpcWallet};
use afen_core::logging::{self, WorkerGuard};
use afen_core::{ConfigManager, MarketConfig};
use afen_integrations::{HttpMetadataService, MetadataService};
use anyhow::{Context, Result};
use tracing::info;

use crate::clipboard::{ClipboardBackend, ClipboardHelper, SystemClipboard};
use crate::create::CreatePage;
use crate::header::Header;
use crate::navigation::{Bounds, NavLink, PointerDown, PointerHub};
use crate::routes::{Route, Router};
use crate::theme::{ThemeManager, ThemeStore};
use crate::wallet_session::WalletSession;

/// Until the renderer reports the drawer's real bounds, every pointer-down
/// counts as outside (an empty rect contains nothing).
const UNMEASURED_PANEL: Bounds = Bounds {
    x: 0.0,
    y: 0.0,
    width: 0.0,
    height: 0.0,
};

/// Every page renders inside the header layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Route(Route),
    /// A wallet-gated page was opened without a connected wallet.
    ConnectWallet(Route),
}

/// Composition root: the header, the pages and the shared wallet session.
pub struct App {
    config: MarketConfig,
    session: WalletSession,
    hub: PointerHub,
    header: Header,
    create: CreatePage,
    router: Router,
}

impl App {
    /// Process startup: open `~/.afen/config.json`, start logging at the
    /// configured level and build the client on the system clipboard.
    ///
    /// Keep the returned guard alive for as long as the app runs.
    pub fn bootstrap() -> Result<(Self, WorkerGuard)> {
        let config =
            Arc::new(ConfigManager::new().context("failed to open marketplace config")?);
        let guard = logging::init_logging(&config.get().log_level)?;
        let app = Self::from_manager(config, Box::new(SystemClipboard::new()))?;
        Ok((app, guard))
    }

    /// [`bootstrap`](Self::bootstrap) against an explicit config file and
    /// log directory.
    pub fn bootstrap_in(
        config_path: &Path,
        logs_dir: &Path,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> Result<(Self, WorkerGuard)> {
        let config = Arc::new(ConfigManager::open(config_path)?);
        let filter = logging::fallback_filter(&config.get().log_level);
        let guard = logging::init_logging_to_dir(logs_dir, &filter)?;
        let app = Self::from_manager(config, clipboard)?;
        Ok((app, guard))
    }

    /// Build from a config manager, which also persists the theme choice.
    pub fn from_manager(
        config: Arc<ConfigManager>,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> Result<Self> {
        let settings = config.get();
        Self::from_config(settings, config, clipboard)
    }

    pub fn from_config(
        config: MarketConfig,
        theme_store: Arc<dyn ThemeStore>,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> Result<Self> {
        config.validate().context("invalid marketplace config")?;

        let rpc = RpcClient::new(&RpcConfig::from_market(&config))
            .context("failed to build JSON-RPC client")?;
        let wallet = Arc::new(RpcWallet::new(
            Arc::new(rpc),
            config.nft_contract_address.clone(),
        ));

        let mobile = match RpcConfig::mobile_from_market(&config) {
            Some(rpc_config) => {
                let rpc = RpcClient::new(&rpc_config)
                    .context("failed to build mobile wallet client")?;
                let mobile: Arc<dyn MobileWalletConnect> = Arc::new(RpcWallet::new(
                    Arc::new(rpc),
                    config.nft_contract_address.clone(),
                ));
                Some(mobile)
            }
            None => None,
        };

        let metadata: Arc<dyn MetadataService> =
            Arc::new(HttpMetadataService::from_config(&config));
        let session = WalletSession::new(wallet, mobile, metadata.clone());

        info!(
            api = %config.api_base_url,
            rpc = %config.rpc_url,
            chain_id = config.chain_id,
            "marketplace client ready"
        );
        Ok(Self::assemble(config, session, metadata, theme_store, clipboard))
    }

    /// Wire the pages around an existing session.
    pub fn assemble(
        config: MarketConfig,
        session: WalletSession,
        metadata: Arc<dyn MetadataService>,
        theme_store: Arc<dyn ThemeStore>,
        clipboard: Box<dyn ClipboardBackend>,
    ) -> Self {
        let hub = PointerHub::new();
        let header = Header::new(
            session.clone(),
            hub.clone(),
            UNMEASURED_PANEL,
            ClipboardHelper::new(clipboard),
            ThemeManager::new(theme_store),
        );
        let create = CreatePage::new(session.clone(), metadata);
        Self {
            config,
            session,
            hub,
            header,
            create,
            router: Router::new(),
        }
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    pub fn create_page(&self) -> &CreatePage {
        &self.create
    }

    pub fn route(&self) -> &Route {
        self.router.current()
    }

    /// What to render below the header.
    pub fn page(&self) -> Page {
        let route = self.router.current().clone();
        if route.requires_wallet() && !self.session.is_connected() {
            Page::ConnectWallet(route)
        } else {
            Page::Route(route)
        }
    }

    pub fn navigate(&mut self, href: &str) -> &Route {
        self.header.close_mobile_menu();
        self.router.navigate(href)
    }

    pub fn back(&mut self) -> bool {
        self.router.back()
    }

    pub fn logo_clicked(&mut self) -> &Route {
        let home = self.header.logo_clicked();
        self.router.navigate(home.path())
    }

    /// A header or drawer link was activated.
    pub fn activate_link(&mut self, link: &NavLink) -> &Route {
        let target = self.header.nav_link_clicked(link);
        self.router.navigate(target.path())
    }

    /// Feed a document-level pointer-down to every listener, then let the
    /// header react to it.
    pub fn dispatch_pointer_down(&mut self, event: PointerDown) -> bool {
        self.hub.dispatch(event);
        self.header.process_pointer_events()
    }
}
