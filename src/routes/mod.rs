/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// This structure ensures that access control is visible at the module level,
/// preventing accidental exposure of protected endpoints.
///
/// The three modules map directly to the three-way identity.

/// Routes accessible to all users (anonymous included): listing, post view,
/// and the register/login flows.
pub mod public;

/// Routes requiring an authenticated identity. Gated by the
/// `RequireAuthenticated` extractor, whose rejection is a redirect toward
/// login rather than a bare 401.
pub mod authenticated;

/// Routes restricted exclusively to the admin: the content mutation surface.
pub mod admin;
