//! The sidebar: which links a role sees, and which one is active.

use serde::Serialize;

use crate::{
    models::{capability::Capability, role::Role},
    services::policy,
};

/// The sidebar section a link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavSection {
    Main,
    Administration,
    Footer,
}

/// A declared sidebar link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub capability: Capability,
    pub section: NavSection,
}

impl NavItem {
    const fn new(capability: Capability, section: NavSection) -> Self {
        Self {
            capability,
            section,
        }
    }

    pub fn title(&self) -> &'static str {
        self.capability.title()
    }

    pub fn url(&self) -> &'static str {
        self.capability.path()
    }
}

/// Every sidebar link, in display order.
pub const NAV_ITEMS: &[NavItem] = &[
    NavItem::new(Capability::Dashboard, NavSection::Main),
    NavItem::new(Capability::AuditChecklist, NavSection::Main),
    NavItem::new(Capability::Reports, NavSection::Main),
    NavItem::new(Capability::StaffCompliance, NavSection::Main),
    NavItem::new(Capability::Policies, NavSection::Main),
    NavItem::new(Capability::Alerts, NavSection::Main),
    NavItem::new(Capability::UserManagement, NavSection::Administration),
    NavItem::new(Capability::ActivityLogs, NavSection::Administration),
    NavItem::new(Capability::Settings, NavSection::Administration),
    NavItem::new(Capability::Profile, NavSection::Footer),
];

/// A link as rendered for one user on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub title: &'static str,
    pub url: &'static str,
    pub capability: Capability,
    pub active: bool,
}

/// The sidebar for one role on one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationShell {
    pub role: Role,
    pub main: Vec<NavLink>,
    /// Empty when the role sees no administration links.
    pub administration: Vec<NavLink>,
    pub footer: Vec<NavLink>,
    pub logout_url: &'static str,
}

/// The endpoint the logout button posts to.
pub const LOGOUT_URL: &str = "/api/auth/logout";

/// Returns `true` if the link at `url` is active on `current_path`.
///
/// The dashboard is only active on exactly `/`; other links stay active on
/// their sub-paths.
pub fn is_active(url: &str, current_path: &str) -> bool {
    if url == "/" {
        return current_path == "/";
    }
    current_path.starts_with(url)
}

/// Returns the declared links visible to `role`, in declaration order.
pub fn visible_items(role: Role) -> impl Iterator<Item = &'static NavItem> {
    NAV_ITEMS
        .iter()
        .filter(move |item| policy::is_allowed(Some(role), item.capability))
}

impl NavigationShell {
    /// Builds the sidebar for `role` while viewing `current_path`.
    pub fn for_role(role: Role, current_path: &str) -> Self {
        let mut shell = Self {
            role,
            main: Vec::new(),
            administration: Vec::new(),
            footer: Vec::new(),
            logout_url: LOGOUT_URL,
        };

        for item in visible_items(role) {
            let link = NavLink {
                title: item.title(),
                url: item.url(),
                capability: item.capability,
                active: is_active(item.url(), current_path),
            };

            match item.section {
                NavSection::Main => shell.main.push(link),
                NavSection::Administration => shell.administration.push(link),
                NavSection::Footer => shell.footer.push(link),
            }
        }

        shell
    }

    /// Iterates over every visible link, section by section.
    pub fn links(&self) -> impl Iterator<Item = &NavLink> {
        self.main
            .iter()
            .chain(self.administration.iter())
            .chain(self.footer.iter())
    }

    pub fn shows_administration(&self) -> bool {
        !self.administration.is_empty()
    }
}
