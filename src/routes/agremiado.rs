/// Agremiado Rule Set
///
/// Prefixes of the screens available to verified union members. Admin
/// sessions are redirected away from these as well: the member area renders
/// only for the `Member` role.
pub const PREFIXES: &[&str] = &[
    // Member document library (read-only).
    "/documentos",
    "/perfil",
    "/rifas",
    "/encuestas",
    // Member home.
    "/agremiado",
];
