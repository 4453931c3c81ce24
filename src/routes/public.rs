/// Public Rule Set
///
/// Paths reachable by any visitor (anonymous or logged-in). A match here is
/// final: the gateway never probes the session for these paths, so visitors
/// always reach public content without a round-trip to the backend.
///
/// Exact paths are compared after normalization (no trailing slash, no query).
pub const EXACT_PATHS: &[&str] = &[
    // Landing page.
    "/",
    // Login form, also the redirect target for unauthorized navigations.
    "/login",
    // News listing.
    "/noticias",
    // Open calls and announcements.
    "/convocatorias",
    "/contacto",
    "/quienes-somos",
];

/// Dynamic public rules, written as `<base>/*`. They match any path with at
/// least one non-empty segment below `<base>`.
pub const DYNAMIC_PATHS: &[&str] = &[
    // News article detail: /noticias/{slug}
    "/noticias/*",
];
