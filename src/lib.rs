// --- Module Structure ---

// Session verification against the backend auth-check endpoint.
pub mod auth;
pub mod config;
// The navigation state machine and its session state.
pub mod gateway;
pub mod layout;
pub mod models;
pub mod reload;

// Rule tables segregated per audience (Public, Agremiado, Admin).
pub mod routes;

// --- Public Re-exports ---

pub use auth::{HttpSessionProbe, MockSessionProbe, ProbeState, SessionProbe};
pub use config::{AppConfig, ConfigError, Env};
pub use gateway::{AuthorizationGateway, SessionState};
pub use layout::{LOGIN_PATH, Layout, select};
pub use models::{Category, Decision, NavigationEvent, NavigationType, Outcome, Phase, Role};
pub use reload::{NavigationTiming, StaticTiming, is_page_reload};
pub use routes::{RouteRules, RuleError, classify};
