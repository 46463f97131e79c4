use crate::models::{Book, Member, NewBook};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so the
/// handlers and the authentication gate interact with the data layer
/// without knowing the concrete implementation (Postgres, in-memory stub).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across request tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Members ---
    /// Looks up a member by login identifier. The authentication gate's
    /// user-lookup collaborator.
    async fn find_member_by_mail(&self, mail_address: &str) -> Option<Member>;
    /// Inserts a new member record (password field already hashed).
    async fn create_member(&self, member: Member) -> Option<Member>;

    // --- Books ---
    async fn list_books(&self) -> Vec<Book>;
    async fn get_book(&self, id: Uuid) -> Option<Book>;
    async fn create_book(&self, book: NewBook) -> Option<Book>;
    /// Overwrites a book's stock count. Returns the updated row, or None
    /// if no such book exists.
    async fn update_stock(&self, id: Uuid, stock: i32) -> Option<Book>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database. Errors are logged and degraded to empty results:
/// a storage fault fails the affected request generically rather than
/// leaking driver details to the client.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOOK_COLUMNS: &str = "id, name, author, publisher, price, isbncode, saledate, explanation, image_path, stock, created_at, updated_at";

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_member_by_mail(&self, mail_address: &str) -> Option<Member> {
        sqlx::query_as::<_, Member>(
            "SELECT id, name, mail_address, password FROM members WHERE mail_address = $1",
        )
        .bind(mail_address)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_member_by_mail error: {:?}", e);
            None
        })
    }

    /// create_member
    ///
    /// Relies on the unique index over `mail_address`: a duplicate insert
    /// errors out and surfaces as None, which the handler reports as a
    /// conflict.
    async fn create_member(&self, member: Member) -> Option<Member> {
        match sqlx::query_as::<_, Member>(
            "INSERT INTO members (id, name, mail_address, password) VALUES ($1, $2, $3, $4) RETURNING id, name, mail_address, password",
        )
        .bind(member.id)
        .bind(&member.name)
        .bind(&member.mail_address)
        .bind(&member.password)
        .fetch_one(&self.pool)
        .await
        {
            Ok(created) => Some(created),
            Err(e) => {
                tracing::error!("create_member error: {:?}", e);
                None
            }
        }
    }

    async fn list_books(&self) -> Vec<Book> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC");
        match sqlx::query_as::<_, Book>(&query).fetch_all(&self.pool).await {
            Ok(books) => books,
            Err(e) => {
                tracing::error!("list_books error: {:?}", e);
                vec![]
            }
        }
    }

    async fn get_book(&self, id: Uuid) -> Option<Book> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_book error: {:?}", e);
                None
            })
    }

    async fn create_book(&self, book: NewBook) -> Option<Book> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO books (id, name, author, publisher, price, isbncode, saledate, explanation, image_path, stock, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) RETURNING {BOOK_COLUMNS}"
        );
        match sqlx::query_as::<_, Book>(&query)
            .bind(Uuid::new_v4())
            .bind(&book.name)
            .bind(&book.author)
            .bind(&book.publisher)
            .bind(book.price)
            .bind(&book.isbncode)
            .bind(&book.saledate)
            .bind(&book.explanation)
            .bind(&book.image_path)
            .bind(book.stock)
            .bind(now)
            .fetch_one(&self.pool)
            .await
        {
            Ok(created) => Some(created),
            Err(e) => {
                tracing::error!("create_book error: {:?}", e);
                None
            }
        }
    }

    async fn update_stock(&self, id: Uuid, stock: i32) -> Option<Book> {
        let query = format!(
            "UPDATE books SET stock = $2, updated_at = NOW() WHERE id = $1 RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(stock)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("update_stock error: {:?}", e);
                None
            })
    }
}
