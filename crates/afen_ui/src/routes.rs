use tracing::debug;

/// Pages of the marketplace client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Explore,
    Create,
    Profile,
    Collections,
    Settings,
    NotFound(String),
}

impl Route {
    /// Resolve a link target. Query strings and a trailing slash are ignored.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/explore" => Self::Explore,
            "/create" => Self::Create,
            "/profile" => Self::Profile,
            "/profile/collections" => Self::Collections,
            "/profile/settings" => Self::Settings,
            _ => Self::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Home => "/",
            Self::Explore => "/explore",
            Self::Create => "/create",
            Self::Profile => "/profile",
            Self::Collections => "/profile/collections",
            Self::Settings => "/profile/settings",
            Self::NotFound(path) => path,
        }
    }

    /// Pages that only make sense with a connected wallet.
    pub fn requires_wallet(&self) -> bool {
        matches!(
            self,
            Self::Create | Self::Profile | Self::Collections | Self::Settings
        )
    }
}

/// Current page plus back history.
#[derive(Debug)]
pub struct Router {
    current: Route,
    history: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            current: Route::Home,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &Route {
        &self.current
    }

    /// Go to `href`. Navigating to the current page does not grow history.
    pub fn navigate(&mut self, href: &str) -> &Route {
        let next = Route::from_path(href);
        if next != self.current {
            debug!(from = self.current.path(), to = next.path(), "navigate");
            let prev = std::mem::replace(&mut self.current, next);
            self.history.push(prev);
        }
        &self.current
    }

    /// Return to the previous page. Returns `false` at the start of history.
    pub fn back(&mut self) -> bool {
        match self.history.pop() {
            Some(prev) => {
                self.current = prev;
                true
            }
            None => false,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
