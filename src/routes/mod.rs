//! Route Classification
//!
//! Maps a URL path to the audience it belongs to. The rule table is segregated
//! into one module per audience, mirroring the three layouts of the SPA shell:
//! a path resolves to at most one of them, and anything else is `Unknown`.

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

use crate::models::Category;

/// Paths every visitor may reach. Checked first and exclusive.
pub mod public;

/// Prefixes reserved for administrators.
pub mod admin;

/// Prefixes reserved for verified union members.
pub mod agremiado;

static DEFAULT_RULES: LazyLock<RouteRules> = LazyLock::new(RouteRules::default);

/// classify
///
/// Classifies `path` against the canonical rule table.
pub fn classify(path: &str) -> Category {
    DEFAULT_RULES.classify(path)
}

/// normalize
///
/// Reduces a location to the form the rule tables are written in: query and
/// fragment dropped, trailing slashes trimmed. The empty path is the root.
pub fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// RuleError
///
/// A defect in a rule table. These are caught when the table is loaded, never
/// while classifying.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("admin prefix `{admin}` overlaps agremiado prefix `{agremiado}`")]
    Overlap { admin: String, agremiado: String },
    #[error("rule `{0}` must start with `/` and must not end with `/`")]
    Malformed(String),
    #[error("dynamic rule `{0}` must have the form `/<base>/*`")]
    MalformedDynamic(String),
}

/// RouteRules
///
/// The full rule table. It is a configuration input: the canonical table comes
/// from the `public`, `admin` and `agremiado` modules, and deployments may load
/// a replacement from JSON (see `AppConfig::route_rules`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRules {
    pub public_exact: Vec<String>,
    /// Patterns of the form `/<base>/*`.
    pub public_dynamic: Vec<String>,
    pub admin_prefixes: Vec<String>,
    pub agremiado_prefixes: Vec<String>,
}

impl Default for RouteRules {
    fn default() -> Self {
        let owned = |rules: &[&str]| rules.iter().map(|rule| rule.to_string()).collect();
        Self {
            public_exact: owned(public::EXACT_PATHS),
            public_dynamic: owned(public::DYNAMIC_PATHS),
            admin_prefixes: owned(admin::PREFIXES),
            agremiado_prefixes: owned(agremiado::PREFIXES),
        }
    }
}

impl RouteRules {
    /// from_json
    ///
    /// Parses and validates a rule table. Unknown or missing fields are errors.
    pub fn from_json(raw: &str) -> Result<Self, crate::config::ConfigError> {
        let rules: RouteRules = serde_json::from_str(raw)?;
        rules.validate()?;
        Ok(rules)
    }

    /// classify
    ///
    /// Evaluation order: public exact set, public dynamic rules, admin prefixes,
    /// agremiado prefixes. The first hit wins, so public content can never be
    /// shadowed by a protected prefix.
    pub fn classify(&self, path: &str) -> Category {
        let path = normalize(path);

        if self.is_public(path) {
            return Category::Public;
        }

        if self.admin_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return Category::Admin;
        }

        if self
            .agremiado_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            return Category::Agremiado;
        }

        Category::Unknown
    }

    fn is_public(&self, path: &str) -> bool {
        if self.public_exact.iter().any(|exact| exact == path) {
            return true;
        }

        // `/noticias/*` needs a non-empty remainder; the bare base is an exact rule.
        self.public_dynamic.iter().any(|pattern| {
            pattern
                .strip_suffix('*')
                .and_then(|base| path.strip_prefix(base))
                .is_some_and(|rest| !rest.is_empty())
        })
    }

    /// validate
    ///
    /// Checks the table is well-formed and that the admin and agremiado prefix
    /// sets are disjoint under prefix matching, so no path can classify as both.
    pub fn validate(&self) -> Result<(), RuleError> {
        let protected = self.admin_prefixes.iter().chain(&self.agremiado_prefixes);
        for rule in self.public_exact.iter().chain(protected) {
            let well_formed = rule.starts_with('/') && (rule == "/" || !rule.ends_with('/'));
            if !well_formed {
                return Err(RuleError::Malformed(rule.clone()));
            }
        }

        for pattern in &self.public_dynamic {
            let well_formed = pattern
                .strip_suffix("/*")
                .is_some_and(|base| base.starts_with('/') && base.len() > 1);
            if !well_formed {
                return Err(RuleError::MalformedDynamic(pattern.clone()));
            }
        }

        for admin in &self.admin_prefixes {
            for agremiado in &self.agremiado_prefixes {
                if admin.starts_with(agremiado.as_str()) || agremiado.starts_with(admin.as_str()) {
                    return Err(RuleError::Overlap {
                        admin: admin.clone(),
                        agremiado: agremiado.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
