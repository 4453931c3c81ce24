use std::fmt;

use crate::models::{Category, Outcome, Phase, Role};

/// Redirect target for navigations the session is not allowed to see.
pub const LOGIN_PATH: &str = "/login";

/// Layout
///
/// The three layouts of the SPA shell. Each one brings its own header and
/// route tree; exactly one mounts for a rendered outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Admin,
    Agremiado,
    Public,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::Admin => "AdminLayout",
            Layout::Agremiado => "AgremiadoLayout",
            Layout::Public => "PublicLayout",
        })
    }
}

/// select
///
/// The decision table, evaluated top to bottom:
///
/// 1. splash phase                      -> `Splash`
/// 2. `Unknown`                         -> `NotFound`
/// 3. `Public`                          -> `RenderPublic`
/// 4. probe still pending               -> `Pending`
/// 5. `Admin` without the admin role    -> `RedirectToLogin`
/// 6. `Agremiado` without member role   -> `RedirectToLogin`
/// 7. otherwise the matching layout
///
/// Rule 4 comes before any role check so a pending probe can never produce a
/// redirect or flash a protected view. `Splash` is reserved for the reload
/// gate of rule 1.
pub fn select(phase: Phase, category: Category, role: Role, checked: bool) -> Outcome {
    if phase == Phase::Splashing {
        return Outcome::Splash;
    }

    match (category, checked, role) {
        (Category::Unknown, _, _) => Outcome::NotFound,
        (Category::Public, _, _) => Outcome::RenderPublic,
        (_, false, _) => Outcome::Pending,
        (Category::Admin, true, Role::Admin) => Outcome::RenderAdmin,
        (Category::Admin, true, _) => Outcome::RedirectToLogin,
        (Category::Agremiado, true, Role::Member) => Outcome::RenderAgremiado,
        (Category::Agremiado, true, _) => Outcome::RedirectToLogin,
    }
}

impl Outcome {
    /// The layout this outcome mounts, if any.
    pub fn layout(self) -> Option<Layout> {
        match self {
            Outcome::RenderAdmin => Some(Layout::Admin),
            Outcome::RenderAgremiado => Some(Layout::Agremiado),
            Outcome::RenderPublic => Some(Layout::Public),
            Outcome::Splash | Outcome::Pending | Outcome::RedirectToLogin | Outcome::NotFound => None,
        }
    }

    pub fn redirect_target(self) -> Option<&'static str> {
        match self {
            Outcome::RedirectToLogin => Some(LOGIN_PATH),
            _ => None,
        }
    }
}
