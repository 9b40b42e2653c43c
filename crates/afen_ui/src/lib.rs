//! Headless view-models for the marketplace client. Each component is a
//! plain state object; its methods are the handlers a renderer binds to.

pub mod app;
pub mod clipboard;
pub mod create;
pub mod header;
pub mod navigation;
pub mod routes;
pub mod theme;
pub mod wallet_session;

pub use app::{App, Page};
pub use clipboard::{ClipboardBackend, ClipboardHelper, SystemClipboard};
pub use create::{
    ART_SAVED_TEXT, ContractSubmissionFlow, CreatePage, CreateView, ERROR_TEXT, ORPHANED_TITLE,
    SUCCESS_TEXT, SubmissionError, SubmissionForm, SubmissionResult, SubmissionStatus,
    SubmitOutcome,
};
pub use header::{Header, NATIVE_SYMBOL, UserDetails};
pub use navigation::{
    Bounds, MenuState, MobileMenu, NavLink, PointerDown, PointerHub, PointerSubscription,
    navigation_links, user_links_mobile,
};
pub use routes::{Route, Router};
pub use theme::{Theme, ThemeIcon, ThemeManager, ThemeStore};
pub use wallet_session::{WalletChannel, WalletSession};
