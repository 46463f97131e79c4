/// Router Module Index
///
/// Organizes the application's routing into security-segregated modules.
/// The split mirrors the access rule table: a module per authentication
/// requirement, so what a route demands is visible from where it lives.
///
/// The rule table itself is enforced by the `access_gate` middleware in
/// `lib.rs`, which wraps the whole router (fallback included); the module
/// split is documentation and a second line of defense, not the mechanism.

/// Routes open to anonymous clients: the login page and its processing
/// endpoints, logout, and member registration.
pub mod public;

/// Book stock routes. Every handler here also resolves the `AuthSession`
/// extractor, so a valid session is required twice over.
pub mod authenticated;
