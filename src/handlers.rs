use crate::{
    AppState,
    auth::{AuthSession, Credentials},
    forms::{BookRegistrationForm, FieldError},
    models::{
        Book, CreateMemberRequest, LoginPage, Member, MemberResponse, NewBook, StockUpdateRequest,
    },
    session::SESSION_COOKIE,
};
use axum::{
    Form, Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// LoginPageQuery
///
/// The login page's only query parameter: the bare `?error` flag appended
/// by a failed login redirect.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LoginPageQuery {
    pub error: Option<String>,
}

// --- Session Handlers ---

/// login_page
///
/// [Public Route] The login entry point. Returns the page descriptor,
/// carrying whether the previous attempt was rejected.
#[utoipa::path(
    get,
    path = "/",
    params(LoginPageQuery),
    responses((status = 200, description = "Login page", body = LoginPage))
)]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        error: query.error.is_some(),
    })
}

/// login
///
/// [Public Route] The login-processing endpoint. Consumes the form-encoded
/// credential pair (`mailAddress`, `password`), runs it through the
/// authentication gate, and on success binds the minted token into the
/// session store and sets the session cookie.
///
/// *Security*: both failure causes (unknown identifier, wrong secret) take
/// the same redirect to `/?error`; the response shape never reveals which
/// one occurred. Only the server log keeps the distinction.
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Redirect: /book/list on success, /?error on failure")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> (CookieJar, Redirect) {
    match state.gate.authenticate(&credentials).await {
        Ok(token) => {
            state.sessions.login(&token).await;
            tracing::info!(member = %token.member_id, "login accepted");

            let jar = jar.add(
                Cookie::build((SESSION_COOKIE, token.value().to_string()))
                    .path("/")
                    .http_only(true),
            );
            // Fixed post-login landing path.
            (jar, Redirect::to("/book/list"))
        }
        Err(failure) => {
            tracing::info!("login rejected: {:?}", failure);
            (jar, Redirect::to("/?error"))
        }
    }
}

/// logout
///
/// [Public Route, POST only] Destroys the presented session and clears the
/// cookie, then redirects to the login page. Routing this as POST only is
/// what keeps a plain link navigation to `/logout` from ending a session.
/// A request without a session cookie still gets the redirect.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Session destroyed, redirect to /"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.logout(cookie.value()).await;

        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        jar.remove(removal)
    } else {
        jar
    };

    (jar, Redirect::to("/"))
}

// --- Member Handlers ---

/// create_member
///
/// [Public Route] Registers a new member. The submitted secret is hashed
/// through the injected encoder before anything is persisted; the raw value
/// never leaves this handler. Duplicate mail addresses are rejected with a
/// conflict.
#[utoipa::path(
    post,
    path = "/member/create",
    request_body(content = CreateMemberRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Registered", body = MemberResponse),
        (status = 400, description = "Missing fields", body = [FieldError]),
        (status = 409, description = "Mail address already registered")
    )
)]
pub async fn create_member(
    State(state): State<AppState>,
    Form(payload): Form<CreateMemberRequest>,
) -> impl IntoResponse {
    // Same required-field contract as the book form, evaluated in one pass.
    let mut errors = Vec::new();
    if payload.name.is_empty() {
        errors.push(FieldError {
            field: "name".to_string(),
            message: crate::forms::REQUIRED_MESSAGE.to_string(),
        });
    }
    if payload.mail_address.is_empty() {
        errors.push(FieldError {
            field: "mailAddress".to_string(),
            message: crate::forms::REQUIRED_MESSAGE.to_string(),
        });
    }
    if payload.password.is_empty() {
        errors.push(FieldError {
            field: "password".to_string(),
            message: crate::forms::REQUIRED_MESSAGE.to_string(),
        });
    }
    if !errors.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
    }

    if state
        .repo
        .find_member_by_mail(&payload.mail_address)
        .await
        .is_some()
    {
        return StatusCode::CONFLICT.into_response();
    }

    let hash = match state.encoder.hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!("password hashing failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let member = Member {
        id: Uuid::new_v4(),
        name: payload.name,
        mail_address: payload.mail_address,
        password: hash,
    };

    match state.repo.create_member(member).await {
        Some(created) => {
            (StatusCode::CREATED, Json(MemberResponse::from(created))).into_response()
        }
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

// --- Book Handlers ---

/// list_books
///
/// [Authenticated Route] The post-login landing data: every book in stock,
/// newest first.
#[utoipa::path(
    get,
    path = "/book/list",
    responses((status = 200, description = "All books", body = [Book]))
)]
pub async fn list_books(
    _session: AuthSession,
    State(state): State<AppState>,
) -> Json<Vec<Book>> {
    Json(state.repo.list_books().await)
}

/// get_book
///
/// [Authenticated Route] Detail view of a single book.
#[utoipa::path(
    get,
    path = "/book/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Found", body = Book),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_book(
    _session: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, StatusCode> {
    match state.repo.get_book(id).await {
        Some(book) => Ok(Json(book)),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// register_book
///
/// [Authenticated Route] Handles the multipart book registration.
///
/// The submission is collected, run through the validation rule list (all
/// violations reported together), the optional cover image is passed
/// through to object storage, and the accepted record is persisted. Nothing
/// is persisted on a validation failure, and a storage or database fault
/// fails the whole request generically.
#[utoipa::path(
    post,
    path = "/book/create",
    responses(
        (status = 201, description = "Registered", body = Book),
        (status = 400, description = "Validation failed", body = [FieldError]),
        (status = 500, description = "Storage or persistence fault")
    )
)]
pub async fn register_book(
    AuthSession { member_id }: AuthSession,
    State(state): State<AppState>,
    multipart: Multipart,
) -> impl IntoResponse {
    let form = match BookRegistrationForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(reason) => {
            tracing::warn!("malformed book registration submission: {reason}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let book = match form.validate() {
        Ok(book) => book,
        Err(errors) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
    };

    let image_path = match &book.image {
        Some(image) => {
            // Derive a unique storage key; only the extension comes from the client.
            let extension = std::path::Path::new(&image.file_name)
                .extension()
                .and_then(std::ffi::OsStr::to_str)
                .unwrap_or("bin");
            let key = format!("books/{}.{}", Uuid::new_v4(), extension);

            match state
                .storage
                .store_object(&key, &image.content_type, image.data.clone())
                .await
            {
                Ok(stored) => Some(stored),
                Err(e) => {
                    tracing::error!("cover image upload failed: {e}");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            }
        }
        None => None,
    };

    let new_book = NewBook {
        name: book.name,
        author: book.author,
        publisher: book.publisher,
        price: book.price,
        isbncode: book.isbncode,
        saledate: book.saledate,
        explanation: book.explanation,
        image_path,
        stock: book.stock,
    };

    match state.repo.create_book(new_book).await {
        Some(created) => {
            tracing::info!(member = %member_id, book = %created.id, "book registered");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// update_stock
///
/// [Authenticated Route] Overwrites a book's stock count (the stock
/// tracking operation performed after sales or restocking).
#[utoipa::path(
    post,
    path = "/book/{id}/stock",
    params(("id" = Uuid, Path, description = "Book ID")),
    request_body(content = StockUpdateRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Updated", body = Book),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_stock(
    AuthSession { member_id }: AuthSession,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(payload): Form<StockUpdateRequest>,
) -> Result<Json<Book>, StatusCode> {
    match state.repo.update_stock(id, payload.stock).await {
        Some(book) => {
            tracing::info!(member = %member_id, book = %book.id, stock = book.stock, "stock updated");
            Ok(Json(book))
        }
        None => Err(StatusCode::NOT_FOUND),
    }
}
