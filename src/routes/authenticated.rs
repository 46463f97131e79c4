use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// The book stock routes. None of these paths appear in the access rule
/// table, so the gate's fail-closed default demands a valid session before
/// any of them run; each handler additionally resolves `AuthSession` to get
/// the acting member's identity.
pub fn book_routes() -> Router<AppState> {
    Router::new()
        // GET /book/list
        // The fixed post-login landing: every registered book, newest first.
        .route("/book/list", get(handlers::list_books))
        // GET /book/{id}
        // Detail view of one book.
        .route("/book/{id}", get(handlers::get_book))
        // POST /book/create
        // Multipart book registration: validated fields plus the optional
        // cover image, which is passed through to object storage.
        .route("/book/create", post(handlers::register_book))
        // POST /book/{id}/stock
        // Stock count tracking: overwrites the stock figure for a book.
        .route("/book/{id}/stock", post(handlers::update_stock))
}
