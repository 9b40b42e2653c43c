use afen_core::MarketError;
use tracing::{info, warn};

use crate::clipboard::ClipboardHelper;
use crate::navigation::{
    Bounds, MobileMenu, NavLink, PointerHub, navigation_links, user_links_mobile,
};
use crate::routes::Route;
use crate::theme::{Theme, ThemeIcon, ThemeManager};
use crate::wallet_session::WalletSession;

/// Ticker used next to the native balance.
pub const NATIVE_SYMBOL: &str = "BNB";

/// What the header shows for a connected account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    /// Display name, or the wallet address when the profile has none.
    pub label: String,
    pub avatar_url: Option<String>,
    /// e.g. `"0.4210 BNB"`; `None` until the balance has loaded.
    pub balance_label: Option<String>,
}

/// Site header: logo, links, theme switch, wallet controls and the mobile
/// drawer.
pub struct Header {
    session: WalletSession,
    menu: MobileMenu,
    clipboard: ClipboardHelper,
    theme: ThemeManager,
}

impl Header {
    pub fn new(
        session: WalletSession,
        hub: PointerHub,
        menu_panel: Bounds,
        clipboard: ClipboardHelper,
        theme: ThemeManager,
    ) -> Self {
        Self {
            session,
            menu: MobileMenu::new(hub, menu_panel),
            clipboard,
            theme,
        }
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn menu(&self) -> &MobileMenu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut MobileMenu {
        &mut self.menu
    }

    // -- Navigation ---------------------------------------------------------

    pub fn logo_clicked(&mut self) -> Route {
        self.menu.close();
        Route::Home
    }

    pub fn nav_link_clicked(&mut self, link: &NavLink) -> Route {
        Route::from_path(self.menu.activate_link(link))
    }

    pub fn open_mobile_menu(&mut self) -> bool {
        self.menu.open()
    }

    pub fn close_mobile_menu(&mut self) -> bool {
        self.menu.close()
    }

    pub fn process_pointer_events(&mut self) -> bool {
        self.menu.process_pointer_events()
    }

    /// Links in the mobile drawer: account links first when connected.
    pub fn mobile_links(&self) -> Vec<NavLink> {
        let mut links = Vec::new();
        if self.session.is_connected() {
            links.extend_from_slice(user_links_mobile());
        }
        links.extend_from_slice(navigation_links());
        links
    }

    // -- Theme --------------------------------------------------------------

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle()
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn theme_attribute(&self) -> &'static str {
        self.theme.attribute()
    }

    pub fn theme_icon(&self) -> ThemeIcon {
        self.theme.icon()
    }

    // -- Wallet -------------------------------------------------------------

    /// The wallet-connect button is only offered when a bridge is configured
    /// and no wallet is connected yet.
    pub fn show_mobile_connect_button(&self) -> bool {
        self.session.supports_mobile() && !self.session.is_connected()
    }

    pub async fn connect_wallet(&self) -> Result<String, MarketError> {
        let address = self.session.connect_wallet().await.inspect_err(|e| {
            warn!("wallet connect failed: {e}");
        })?;
        info!(%address, "wallet connected");
        Ok(address)
    }

    pub async fn handle_mobile_connection(&mut self) -> Result<String, MarketError> {
        let address = self.session.mobile_wallet_connect().await.inspect_err(|e| {
            warn!("mobile wallet connect failed: {e}");
        })?;
        self.menu.close();
        info!(%address, "mobile wallet connected");
        Ok(address)
    }

    pub async fn disconnect_wallet(&mut self) {
        self.session.disconnect_wallet().await;
        self.clipboard.clear_copied();
        self.menu.close();
    }

    pub fn user_details(&self) -> Option<UserDetails> {
        let snapshot = self.session.snapshot();
        let label = snapshot.display_label()?.to_string();
        Some(UserDetails {
            label,
            avatar_url: snapshot.user.as_ref().and_then(|u| u.avatar_url.clone()),
            balance_label: snapshot
                .balance
                .as_ref()
                .map(|b| format!("{b} {NATIVE_SYMBOL}")),
        })
    }

    // -- Clipboard ----------------------------------------------------------

    /// Copy the connected address. `false` when disconnected or the copy failed.
    pub fn copy_wallet_address(&mut self) -> bool {
        match self.session.address() {
            Some(address) => self.clipboard.copy(&address),
            None => false,
        }
    }

    pub fn wallet_address_copied(&self) -> bool {
        self.clipboard.is_copied()
    }

    pub fn clear_copied(&mut self) {
        self.clipboard.clear_copied();
    }
}
