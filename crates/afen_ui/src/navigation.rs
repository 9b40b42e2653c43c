use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

const NAVIGATION_LINKS: &[NavLink] = &[
    NavLink {
        label: "Explore",
        href: "/explore",
    },
    NavLink {
        label: "Create",
        href: "/create",
    },
];

const USER_LINKS_MOBILE: &[NavLink] = &[
    NavLink {
        label: "My Profile",
        href: "/profile",
    },
    NavLink {
        label: "My Collections",
        href: "/profile/collections",
    },
    NavLink {
        label: "Settings",
        href: "/profile/settings",
    },
];

/// Links shown in the header on every viewport.
pub fn navigation_links() -> &'static [NavLink] {
    NAVIGATION_LINKS
}

/// Extra account links shown in the mobile menu when a wallet is connected.
pub fn user_links_mobile() -> &'static [NavLink] {
    USER_LINKS_MOBILE
}

// ---------------------------------------------------------------------------
// Pointer events
// ---------------------------------------------------------------------------

/// A global pointer-down at viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Edges are inside. A rect with no area contains nothing.
    pub fn contains(&self, event: PointerDown) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && event.x >= self.x
            && event.x <= self.x + self.width
            && event.y >= self.y
            && event.y <= self.y + self.height
    }
}

#[derive(Debug, Default)]
struct HubInner {
    next_id: u64,
    listeners: HashMap<u64, mpsc::UnboundedSender<PointerDown>>,
}

/// Document-level pointer-down dispatcher. Clones share one listener table.
#[derive(Debug, Clone, Default)]
pub struct PointerHub {
    inner: Arc<Mutex<HubInner>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned
    /// subscription is dropped.
    pub fn subscribe(&self) -> PointerSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, tx);
        debug!(listener = id, "pointer listener registered");
        PointerSubscription {
            id,
            rx,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every registered listener; returns how many got it.
    pub fn dispatch(&self, event: PointerDown) -> usize {
        let inner = self.inner.lock();
        inner
            .listeners
            .values()
            .filter(|tx| tx.send(event).is_ok())
            .count()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

/// Scoped registration on a [`PointerHub`]; deregisters on drop.
#[derive(Debug)]
pub struct PointerSubscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<PointerDown>,
    hub: Weak<Mutex<HubInner>>,
}

impl PointerSubscription {
    /// Next queued event, if any.
    pub fn try_next(&mut self) -> Option<PointerDown> {
        self.rx.try_recv().ok()
    }
}

impl Drop for PointerSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner.lock().listeners.remove(&self.id);
            debug!(listener = self.id, "pointer listener removed");
        }
    }
}

// ---------------------------------------------------------------------------
// Mobile menu
// ---------------------------------------------------------------------------

/// The open state owns the outside-click listener, so leaving it (or
/// dropping the menu) releases the registration.
#[derive(Debug, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open { listener: PointerSubscription },
}

/// Mobile navigation drawer.
#[derive(Debug)]
pub struct MobileMenu {
    state: MenuState,
    hub: PointerHub,
    panel: Bounds,
}

impl MobileMenu {
    pub fn new(hub: PointerHub, panel: Bounds) -> Self {
        Self {
            state: MenuState::Closed,
            hub,
            panel,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, MenuState::Open { .. })
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    /// Where the drawer is drawn; pointer-downs inside it do not dismiss.
    pub fn set_panel_bounds(&mut self, panel: Bounds) {
        self.panel = panel;
    }

    /// Menu icon. Returns `true` if the menu was closed before.
    pub fn open(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.state = MenuState::Open {
            listener: self.hub.subscribe(),
        };
        true
    }

    /// Close icon. Returns `true` if the menu was open before.
    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = MenuState::Closed;
        true
    }

    /// Any navigation link inside the menu: closes it and yields the target.
    pub fn activate_link(&mut self, link: &NavLink) -> &'static str {
        self.close();
        link.href
    }

    /// Drain pointer-downs queued since the last call. Closes the menu on the
    /// first one outside the panel. Returns `true` if the menu closed.
    pub fn process_pointer_events(&mut self) -> bool {
        let MenuState::Open { listener } = &mut self.state else {
            return false;
        };
        let mut outside = false;
        while let Some(event) = listener.try_next() {
            if !self.panel.contains(event) {
                outside = true;
            }
        }
        if outside {
            debug!("outside pointer-down, closing mobile menu");
            self.close()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Bounds {
        Bounds::new(0.0, 64.0, 400.0, 300.0)
    }

    const INSIDE: PointerDown = PointerDown { x: 10.0, y: 100.0 };
    const OUTSIDE: PointerDown = PointerDown { x: 10.0, y: 600.0 };

    #[test]
    fn starts_closed_without_listener() {
        let hub = PointerHub::new();
        let menu = MobileMenu::new(hub.clone(), panel());
        assert!(!menu.is_open());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn open_registers_exactly_one_listener() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), panel());

        assert!(menu.open());
        assert!(!menu.open());
        assert!(menu.is_open());
        assert_eq!(hub.listener_count(), 1);
    }

    #[test]
    fn close_releases_listener() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), panel());
        menu.open();
        assert!(menu.close());
        assert_eq!(hub.listener_count(), 0);
        assert!(!menu.close());
    }

    #[test]
    fn drop_releases_listener() {
        let hub = PointerHub::new();
        {
            let mut menu = MobileMenu::new(hub.clone(), panel());
            menu.open();
            assert_eq!(hub.listener_count(), 1);
        }
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn outside_pointer_closes_open_menu() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), panel());
        menu.open();

        assert_eq!(hub.dispatch(OUTSIDE), 1);
        assert!(menu.process_pointer_events());
        assert!(!menu.is_open());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn inside_pointer_keeps_menu_open() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), panel());
        menu.open();

        hub.dispatch(INSIDE);
        assert!(!menu.process_pointer_events());
        assert!(menu.is_open());
    }

    #[test]
    fn pointer_while_closed_changes_nothing() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), panel());

        assert_eq!(hub.dispatch(OUTSIDE), 0);
        assert!(!menu.process_pointer_events());
        assert!(!menu.is_open());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn events_before_reopen_are_not_replayed() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), panel());

        menu.open();
        menu.close();
        hub.dispatch(OUTSIDE);
        menu.open();
        assert!(!menu.process_pointer_events());
        assert!(menu.is_open());
    }

    #[test]
    fn link_activation_closes_and_returns_target() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), panel());
        menu.open();

        let href = menu.activate_link(&navigation_links()[1]);
        assert_eq!(href, "/create");
        assert!(!menu.is_open());
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn bounds_contains_edges() {
        let b = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains(PointerDown { x: 0.0, y: 0.0 }));
        assert!(b.contains(PointerDown { x: 10.0, y: 10.0 }));
        assert!(!b.contains(PointerDown { x: 10.1, y: 5.0 }));
    }

    #[test]
    fn empty_bounds_contain_nothing() {
        let origin = PointerDown { x: 0.0, y: 0.0 };
        assert!(!Bounds::new(0.0, 0.0, 0.0, 0.0).contains(origin));
        assert!(!Bounds::new(0.0, 0.0, 10.0, 0.0).contains(origin));
        assert!(!Bounds::new(0.0, 0.0, -5.0, 10.0).contains(origin));
    }

    #[test]
    fn unmeasured_panel_closes_on_any_pointer() {
        let hub = PointerHub::new();
        let mut menu = MobileMenu::new(hub.clone(), Bounds::new(0.0, 0.0, 0.0, 0.0));
        menu.open();

        hub.dispatch(PointerDown { x: 0.0, y: 0.0 });
        assert!(menu.process_pointer_events());
        assert!(!menu.is_open());
    }

    #[test]
    fn link_tables() {
        assert_eq!(navigation_links().len(), 2);
        assert!(user_links_mobile().iter().all(|l| l.href.starts_with("/profile")));
    }
}
