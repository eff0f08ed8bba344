use serde::{Deserialize, Serialize};

/// A protected page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Dashboard,
    AuditChecklist,
    StaffCompliance,
    Policies,
    Alerts,
    Reports,
    Settings,
    UserManagement,
    ActivityLogs,
    Profile,
}

impl Capability {
    /// Every capability, in route declaration order.
    pub const ALL: [Capability; 10] = [
        Capability::Dashboard,
        Capability::AuditChecklist,
        Capability::StaffCompliance,
        Capability::Policies,
        Capability::Alerts,
        Capability::Reports,
        Capability::Settings,
        Capability::UserManagement,
        Capability::ActivityLogs,
        Capability::Profile,
    ];

    /// Returns the stable name of the capability.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Dashboard => "dashboard",
            Capability::AuditChecklist => "audit-checklist",
            Capability::StaffCompliance => "staff-compliance",
            Capability::Policies => "policies",
            Capability::Alerts => "alerts",
            Capability::Reports => "reports",
            Capability::Settings => "settings",
            Capability::UserManagement => "user-management",
            Capability::ActivityLogs => "activity-logs",
            Capability::Profile => "profile",
        }
    }

    /// Returns the route the capability is served on.
    pub fn path(&self) -> &'static str {
        match self {
            Capability::Dashboard => "/",
            Capability::AuditChecklist => "/audit-checklist",
            Capability::StaffCompliance => "/staff-compliance",
            Capability::Policies => "/policies",
            Capability::Alerts => "/alerts",
            Capability::Reports => "/reports",
            Capability::Settings => "/settings",
            Capability::UserManagement => "/user-management",
            Capability::ActivityLogs => "/activity-logs",
            Capability::Profile => "/profile",
        }
    }

    /// Returns the page heading.
    pub fn title(&self) -> &'static str {
        match self {
            Capability::Dashboard => "Dashboard",
            Capability::AuditChecklist => "Audit Checklist",
            Capability::StaffCompliance => "Staff Compliance",
            Capability::Policies => "Policies & Docs",
            Capability::Alerts => "Alerts",
            Capability::Reports => "Reports",
            Capability::Settings => "Settings",
            Capability::UserManagement => "User Management",
            Capability::ActivityLogs => "Activity Logs",
            Capability::Profile => "Profile",
        }
    }

    /// Returns the one-line page description shown under the heading.
    pub fn description(&self) -> &'static str {
        match self {
            Capability::Dashboard => "Overview of your home's inspection readiness",
            Capability::AuditChecklist => "Track audit items, evidence and completion status",
            Capability::StaffCompliance => "Monitor staff training, DBS checks and records",
            Capability::Policies => "Manage policy documents and staff acknowledgements",
            Capability::Alerts => "Upcoming expiries and overdue actions",
            Capability::Reports => "Compliance reports and progress over time",
            Capability::Settings => "Configure the home and notification preferences",
            Capability::UserManagement => "Manage user accounts and roles",
            Capability::ActivityLogs => "Track all system activities and changes",
            Capability::Profile => "Manage your account settings and information",
        }
    }

    /// Looks up a capability by its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Looks up a capability by exact route path.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.path() == path)
    }
}
