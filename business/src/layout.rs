//! Dashboard navigation: menu entries and layout flags.

use crate::i18n::Translate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub id: &'static str,
    pub label: String,
}

impl MenuItem {
    fn new(id: &'static str, label_key: &str, t: &dyn Translate) -> Self {
        Self {
            id,
            label: t.t(label_key),
        }
    }
}

/// Sections every signed-in player sees.
pub fn player_menu_items(t: &dyn Translate) -> Vec<MenuItem> {
    vec![
        MenuItem::new("profile", "dashboard.menu.profile", t),
        MenuItem::new("downloads", "dashboard.menu.downloads", t),
    ]
}

/// Sections only admins see.
pub fn admin_menu_items(t: &dyn Translate) -> Vec<MenuItem> {
    vec![
        MenuItem::new("server-status", "dashboard.menu.server_status", t),
        MenuItem::new("user-management", "dashboard.menu.user_management", t),
        MenuItem::new("audit-log", "dashboard.menu.audit_log", t),
    ]
}

/// View state of the dashboard shell. No I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardLayout {
    pub sidebar_collapsed: bool,
    pub mobile_menu_open: bool,
    pub active_section: String,
    player_items: Vec<MenuItem>,
    admin_items: Vec<MenuItem>,
}

impl DashboardLayout {
    pub fn new(
        default_section: impl Into<String>,
        player_items: Vec<MenuItem>,
        admin_items: Vec<MenuItem>,
    ) -> Self {
        Self {
            sidebar_collapsed: false,
            mobile_menu_open: false,
            active_section: default_section.into(),
            player_items,
            admin_items,
        }
    }

    /// Layout with the standard menus; admin sections only when `is_admin`.
    pub fn for_user(t: &dyn Translate, is_admin: bool) -> Self {
        let admin_items = if is_admin {
            admin_menu_items(t)
        } else {
            Vec::new()
        };
        Self::new("profile", player_menu_items(t), admin_items)
    }

    pub fn menu_items(&self) -> impl Iterator<Item = &MenuItem> {
        self.player_items.iter().chain(&self.admin_items)
    }

    /// Label of the active section, or an empty string when it is not a menu entry.
    pub fn current_section_title(&self) -> &str {
        self.menu_items()
            .find(|item| item.id == self.active_section)
            .map_or("", |item| item.label.as_str())
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    pub fn toggle_mobile_menu(&mut self) {
        self.mobile_menu_open = !self.mobile_menu_open;
    }

    pub fn close_mobile_menu(&mut self) {
        self.mobile_menu_open = false;
    }

    /// Switch section; also closes the mobile menu.
    pub fn set_active_section(&mut self, section: impl Into<String>) {
        self.active_section = section.into();
        self.close_mobile_menu();
    }
}
