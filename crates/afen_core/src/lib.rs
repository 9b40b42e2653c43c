pub mod config;
pub mod error_handler;
pub mod logging;
pub mod session;

pub use config::{ConfigManager, MarketConfig, validate_address, validate_url};
pub use error_handler::{ErrorCategory, MarketError};
pub use session::{UserProfile, UserSession};
