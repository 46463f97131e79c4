use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client. These are exactly the paths the access rule table lists as
/// ALLOW_ALL: the login page, the login/logout processing endpoints, and
/// member registration.
///
/// Note that `/logout` is registered for POST only. A GET to the same path
/// is rejected by method routing before any session handling runs, which
/// is what keeps a plain link navigation from destroying a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /?error
        // The login entry point. Returns the page descriptor; the `error`
        // flag is set when a failed login redirected back here.
        .route("/", get(handlers::login_page))
        // POST /login
        // Login processing: consumes `mailAddress` and `password` form
        // fields and redirects to /book/list or back to /?error.
        .route("/login", post(handlers::login))
        // POST /logout
        // Destroys the presented session and redirects to /.
        .route("/logout", post(handlers::logout))
        // GET /member/form
        // The member registration entry point. Rendering is a front-end
        // concern; the path exists so the anonymous registration navigation
        // flow keeps working.
        .route("/member/form", get(|| async { "member registration form" }))
        // POST /member/create
        // Registers a new member with a hashed secret.
        .route("/member/create", post(handlers::create_member))
}
