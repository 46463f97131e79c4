use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Member
///
/// A registered member's canonical record in the `members` table. The
/// `password` column holds the Argon2id PHC hash, never a raw secret, and
/// the struct is deliberately not serializable so the hash cannot reach a
/// response body by accident.
#[derive(Debug, Clone, FromRow, Default)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    // The login identifier; unique across members.
    pub mail_address: String,
    // Argon2id hash of the member's secret.
    pub password: String,
}

/// Book
///
/// A book record from the `books` table: the primary data structure of the
/// stock management domain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Book {
    pub id: Uuid,
    pub name: String,
    pub author: String,
    pub publisher: String,
    pub price: i32,
    pub isbncode: String,
    // Kept as the submitted `YYYY-MM-DD` string; the form's grammar check
    // is the only validation applied to it.
    pub saledate: String,
    pub explanation: String,
    // Object-storage key of the uploaded cover image, when one was sent.
    pub image_path: Option<String>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// --- Request Payloads (Input Schemas) ---

/// CreateMemberRequest
///
/// Input payload for the public registration endpoint (POST /member/create).
/// `mailAddress` is the wire name shared with the login form. The raw
/// password only lives long enough to be hashed; no `Debug` derive, so it
/// cannot leak through logging.
#[derive(Clone, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    pub name: String,
    #[serde(rename = "mailAddress")]
    pub mail_address: String,
    pub password: String,
}

/// NewBook
///
/// A fully validated book ready for insertion: the accepted form fields
/// plus the storage key of the uploaded image, if any.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub author: String,
    pub publisher: String,
    pub price: i32,
    pub isbncode: String,
    pub saledate: String,
    pub explanation: String,
    pub image_path: Option<String>,
    pub stock: i32,
}

/// StockUpdateRequest
///
/// Form payload for the stock-count update endpoint. Negative values are
/// accepted, matching the registration form's unenforced lower bound.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct StockUpdateRequest {
    pub stock: i32,
}

/// --- Output Schemas ---

/// MemberResponse
///
/// What registration returns to the client: the created identity without
/// any credential material.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MemberResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "mailAddress")]
    pub mail_address: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            name: member.name,
            mail_address: member.mail_address,
        }
    }
}

/// LoginPage
///
/// Descriptor returned by `GET /`. Rendering the login form is a front-end
/// concern; this carries the one piece of page state: whether the previous
/// attempt failed (`/?error`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct LoginPage {
    pub error: bool,
}
