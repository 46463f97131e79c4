use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::Arc;
use stock_portal::{
    AppConfig, AppState, MockStorageService, create_router,
    access::AccessRuleTable,
    auth::{AuthFailure, AuthenticationGate, Credentials, PasswordEncoder},
    models::{Book, Member, NewBook},
    repository::{Repository, RepositoryState},
    session::{InMemorySessionStore, SessionLifecycle, SessionState},
    storage::StorageState,
};
use tower::util::ServiceExt;
use uuid::Uuid;

// --- Stub Repository for Gate Logic ---

/// Holds exactly one member record; everything else is empty.
struct SingleMemberRepo {
    member: Member,
}

#[async_trait]
impl Repository for SingleMemberRepo {
    async fn find_member_by_mail(&self, mail_address: &str) -> Option<Member> {
        (self.member.mail_address == mail_address).then(|| self.member.clone())
    }
    async fn create_member(&self, _member: Member) -> Option<Member> {
        None
    }
    async fn list_books(&self) -> Vec<Book> {
        vec![]
    }
    async fn get_book(&self, _id: Uuid) -> Option<Book> {
        None
    }
    async fn create_book(&self, _book: NewBook) -> Option<Book> {
        None
    }
    async fn update_stock(&self, _id: Uuid, _stock: i32) -> Option<Book> {
        None
    }
}

fn seeded_member(mail: &str, password: &str) -> Member {
    let hash = PasswordEncoder::new()
        .hash_password(password)
        .expect("hashing succeeds");
    Member {
        id: Uuid::new_v4(),
        name: "Test Member".to_string(),
        mail_address: mail.to_string(),
        password: hash,
    }
}

fn gate_over(member: Member) -> AuthenticationGate {
    let repo = Arc::new(SingleMemberRepo { member }) as RepositoryState;
    AuthenticationGate::new(repo, PasswordEncoder::new())
}

fn credentials(mail: &str, password: &str) -> Credentials {
    Credentials {
        mail_address: mail.to_string(),
        password: password.to_string(),
    }
}

fn app(member: Member) -> axum::Router {
    let repo = Arc::new(SingleMemberRepo { member }) as RepositoryState;
    let storage = Arc::new(MockStorageService::new()) as StorageState;
    let store = Arc::new(InMemorySessionStore::new(30)) as SessionState;
    let sessions = SessionLifecycle::new(store);
    let encoder = PasswordEncoder::new();
    let gate = AuthenticationGate::new(repo.clone(), encoder.clone());

    create_router(AppState {
        repo,
        storage,
        sessions,
        gate,
        encoder,
        access: AccessRuleTable::default(),
        config: AppConfig::default(),
    })
}

// --- Gate Unit Properties ---

#[tokio::test]
async fn correct_credentials_yield_a_bound_token() {
    let member = seeded_member("member@example.com", "correct-horse");
    let member_id = member.id;
    let gate = gate_over(member);

    let token = gate
        .authenticate(&credentials("member@example.com", "correct-horse"))
        .await
        .expect("authentication should succeed");

    assert_eq!(token.member_id, member_id);
    assert!(!token.value().is_empty());
}

#[tokio::test]
async fn wrong_secret_is_a_bad_credential() {
    let gate = gate_over(seeded_member("member@example.com", "correct-horse"));

    let failure = gate
        .authenticate(&credentials("member@example.com", "battery-staple"))
        .await
        .expect_err("wrong secret must fail");

    assert_eq!(failure, AuthFailure::BadCredential);
}

#[tokio::test]
async fn unknown_identifier_is_not_found() {
    let gate = gate_over(seeded_member("member@example.com", "correct-horse"));

    let failure = gate
        .authenticate(&credentials("nobody@example.com", "correct-horse"))
        .await
        .expect_err("unknown identifier must fail");

    assert_eq!(failure, AuthFailure::NotFound);
}

#[test]
fn hashing_is_salted_and_verifiable() {
    let encoder = PasswordEncoder::new();

    let first = encoder.hash_password("secret").expect("hashing succeeds");
    let second = encoder.hash_password("secret").expect("hashing succeeds");

    // Fresh salt per hash: same secret, different hashes, both verify.
    assert_ne!(first, second);
    assert!(encoder.verify("secret", &first));
    assert!(encoder.verify("secret", &second));
    assert!(!encoder.verify("not the secret", &first));
}

// --- Failure Shape Over HTTP ---

#[tokio::test]
async fn failure_causes_are_indistinguishable_to_the_client() {
    let app = app(seeded_member("member@example.com", "correct-horse"));

    let wrong_secret = app
        .clone()
        .oneshot(login_request("member@example.com", "battery-staple"))
        .await
        .expect("request succeeds");
    let unknown_mail = app
        .clone()
        .oneshot(login_request("nobody@example.com", "correct-horse"))
        .await
        .expect("request succeeds");

    // Same status, same redirect target, and neither issues a session
    // cookie: the response shape cannot be used to probe for registered
    // mail addresses.
    assert_eq!(wrong_secret.status(), StatusCode::SEE_OTHER);
    assert_eq!(unknown_mail.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        wrong_secret.headers().get("location"),
        unknown_mail.headers().get("location")
    );
    assert_eq!(
        wrong_secret
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok()),
        Some("/?error")
    );
    assert!(wrong_secret.headers().get("set-cookie").is_none());
    assert!(unknown_mail.headers().get("set-cookie").is_none());
}

fn login_request(mail: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(format!("mailAddress={mail}&password={password}")))
        .expect("request builds")
}
