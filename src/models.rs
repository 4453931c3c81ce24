use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use ts_rs::TS;

// --- Audience & Identity ---

/// Category
///
/// The audience a URL path belongs to. It is derived on every navigation by the
/// route classifier and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Category {
    Public,
    Agremiado,
    Admin,
    Unknown,
}

/// Role
///
/// The caller's verified role as reported by the backend auth-check endpoint.
/// `None` means "unknown or anonymous", never "denied".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    #[default]
    None,
    Member,
    Admin,
}

impl Role {
    /// Maps the backend's numeric role identifier (`1` = member, `2` = admin).
    /// Any other identifier is not a role this portal knows about.
    pub fn from_role_id(role_id: i64) -> Option<Self> {
        match role_id {
            1 => Some(Role::Member),
            2 => Some(Role::Admin),
            _ => None,
        }
    }
}

// --- Navigation Input ---

/// NavigationType
///
/// The entry type recorded by the browser's navigation-timing facility for the
/// document load. Only `Reload` triggers the boot splash screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NavigationType {
    Navigate,
    Reload,
    BackForward,
    Prerender,
}

impl FromStr for NavigationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "navigate" => Ok(NavigationType::Navigate),
            "reload" => Ok(NavigationType::Reload),
            "back_forward" | "back-forward" => Ok(NavigationType::BackForward),
            "prerender" => Ok(NavigationType::Prerender),
            other => Err(format!(
                "unknown navigation type `{other}` (expected navigate, reload, back_forward or prerender)"
            )),
        }
    }
}

/// NavigationEvent
///
/// One route change. Produced once per client-side path change and once at
/// application start; only the boot event may carry `is_reload = true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    pub path: String,
    pub is_reload: bool,
}

impl NavigationEvent {
    /// A client-side route push. Never a reload.
    pub fn push(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_reload: false,
        }
    }
}

// --- Gateway Output ---

/// Phase
///
/// Where the gateway stood for the navigation when a decision was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Phase {
    /// Boot-time splash after a full page reload.
    Splashing,
    /// A session probe is in flight for this navigation.
    Probing,
    /// Terminal state for the navigation.
    Decided,
}

/// Outcome
///
/// The rendering or redirect decision handed to the SPA shell. This is the only
/// value the layouts and the not-found view ever receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Outcome {
    /// Boot-time splash screen after a full page reload.
    Splash,
    /// Neutral placeholder while the session probe is in flight.
    Pending,
    RenderPublic,
    RenderAgremiado,
    RenderAdmin,
    RedirectToLogin,
    NotFound,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Splash => "splash",
            Outcome::Pending => "pending",
            Outcome::RenderPublic => "render_public",
            Outcome::RenderAgremiado => "render_agremiado",
            Outcome::RenderAdmin => "render_admin",
            Outcome::RedirectToLogin => "redirect_to_login",
            Outcome::NotFound => "not_found",
        };
        f.write_str(name)
    }
}

/// Decision
///
/// A read-only snapshot emitted by the authorization gateway. It carries the
/// classified category and the session values the outcome was computed from,
/// so consumers never touch the gateway's internal state directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Decision {
    pub phase: Phase,
    pub path: String,
    pub category: Category,
    pub role: Role,
    pub checked: bool,
    // Probe epoch current when the snapshot was taken.
    #[ts(type = "number")]
    pub epoch: u64,
    pub outcome: Outcome,
}
