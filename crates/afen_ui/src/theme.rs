use std::sync::Arc;

use afen_core::ConfigManager;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Two-valued colour scheme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    /// The other theme.
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse from a config string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Icon shown on the theme switch: the sun switches to light, the moon to dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeIcon {
    Sun,
    Moon,
}

/// Where the preference lives between runs.
pub trait ThemeStore: Send + Sync {
    fn load_theme(&self) -> Option<Theme>;
    fn save_theme(&self, theme: Theme) -> anyhow::Result<()>;
}

impl ThemeStore for ConfigManager {
    fn load_theme(&self) -> Option<Theme> {
        Theme::from_str_loose(&self.get().theme)
    }

    fn save_theme(&self, theme: Theme) -> anyhow::Result<()> {
        self.update(|config| config.theme = theme.as_str().to_string())
    }
}

/// Current theme plus its persistence.
pub struct ThemeManager {
    current: Theme,
    store: Arc<dyn ThemeStore>,
}

impl ThemeManager {
    /// Load the stored preference, defaulting to dark.
    pub fn new(store: Arc<dyn ThemeStore>) -> Self {
        let current = store.load_theme().unwrap_or_default();
        Self { current, store }
    }

    pub fn theme(&self) -> Theme {
        self.current
    }

    /// Value of the `class` attribute on the rendered root.
    pub fn attribute(&self) -> &'static str {
        self.current.as_str()
    }

    pub fn icon(&self) -> ThemeIcon {
        match self.current {
            Theme::Dark => ThemeIcon::Sun,
            Theme::Light => ThemeIcon::Moon,
        }
    }

    /// Flip the theme. A failed save is logged; the switch still applies.
    pub fn toggle(&mut self) -> Theme {
        self.set_theme(self.current.toggle());
        self.current
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.current = theme;
        debug!(theme = theme.as_str(), "theme changed");
        if let Err(e) = self.store.save_theme(theme) {
            warn!("failed to persist theme preference: {e:#}");
        }
    }
}
