/// Admin Rule Set
///
/// Prefixes of the screens exclusively available to administrators. Any path
/// starting with one of these mounts the admin layout, provided the session
/// probe confirms the `Admin` role.
///
/// None of these may share a prefix relationship with the agremiado prefixes;
/// `RouteRules::validate` rejects tables that break this.
pub const PREFIXES: &[&str] = &[
    // Dashboard landing for administrators.
    "/panel-admin",
    // Document library management (upload, publish, delete).
    "/admin_documentos",
    // News editor.
    "/admin_noticias",
    // Member roster management.
    "/admin_agremiados",
    // Raffle administration.
    "/admin_rifas",
    // Survey administration and results.
    "/admin_encuestas",
];
