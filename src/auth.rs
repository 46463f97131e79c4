use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    repository::RepositoryState,
    session::{SESSION_COOKIE, SessionLifecycle},
};

/// Credentials
///
/// The submitted credential pair. The parameter names `mailAddress` and
/// `password` are wire-protocol contract: existing clients submit exactly
/// these names, whatever the internal field names are.
///
/// The secret is transient: it is compared against the stored hash and then
/// dropped, never persisted, and redacted from debug output so it cannot
/// leak through request logging.
#[derive(Clone, Deserialize, ToSchema)]
pub struct Credentials {
    #[serde(rename = "mailAddress")]
    pub mail_address: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("mail_address", &self.mail_address)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// AuthFailure
///
/// Why an authentication attempt was rejected. The two causes are kept
/// distinct for server-side logging, but callers must surface them to the
/// client identically so the login endpoint cannot be used to enumerate
/// registered mail addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthFailure {
    /// No member record exists for the submitted identifier.
    NotFound,
    /// The member exists but the secret did not match the stored hash.
    BadCredential,
}

/// SessionToken
///
/// Proof of a successful authentication: an opaque value bound to the
/// member it was issued for. Minted only by `AuthenticationGate` and handed
/// to `SessionLifecycle::login` for binding into the session store.
#[derive(Clone, Debug)]
pub struct SessionToken {
    value: String,
    pub member_id: Uuid,
}

impl SessionToken {
    fn issue(member_id: Uuid) -> Self {
        Self {
            value: Uuid::new_v4().simple().to_string(),
            member_id,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// PasswordEncoder
///
/// One-way secret hashing using Argon2id with a fresh random salt per hash.
/// Stored hashes are self-describing PHC strings, so parameters can evolve
/// without a schema change.
#[derive(Clone, Default)]
pub struct PasswordEncoder;

impl PasswordEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Hashes a raw secret for storage.
    pub fn hash_password(&self, raw: &str) -> Result<String, String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(raw.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| e.to_string())
    }

    /// verify
    ///
    /// Checks a raw secret against a stored PHC hash string. The underlying
    /// verifier performs the constant-semantics comparison. An unparsable
    /// stored hash is logged and treated as a mismatch; the gate fails
    /// closed rather than erroring out to the client.
    pub fn verify(&self, raw: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(raw.as_bytes(), &parsed)
                .is_ok(),
            Err(e) => {
                tracing::error!("stored password hash is unparsable: {e}");
                false
            }
        }
    }
}

/// AuthenticationGate
///
/// Validates submitted credentials against the member records. Both
/// collaborators, the lookup repository and the hashing function, are
/// injected at construction in `main`, so the gate can be exercised in
/// tests with a stub repository and no infrastructure.
#[derive(Clone)]
pub struct AuthenticationGate {
    repo: RepositoryState,
    encoder: PasswordEncoder,
}

impl AuthenticationGate {
    pub fn new(repo: RepositoryState, encoder: PasswordEncoder) -> Self {
        Self { repo, encoder }
    }

    /// authenticate
    ///
    /// Looks up the member by mail address and verifies the secret against
    /// the stored hash. On success mints a `SessionToken` bound to the
    /// member id. The caller is responsible for binding the token into the
    /// session store and for the success/failure redirects.
    pub async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionToken, AuthFailure> {
        let member = self
            .repo
            .find_member_by_mail(&credentials.mail_address)
            .await
            .ok_or(AuthFailure::NotFound)?;

        if self.encoder.verify(&credentials.password, &member.password) {
            Ok(SessionToken::issue(member.id))
        } else {
            Err(AuthFailure::BadCredential)
        }
    }
}

/// AuthSession
///
/// The resolved identity of an authenticated request: the member id the
/// presented session token was issued for.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub member_id: Uuid,
}

/// AuthSession Extractor Implementation
///
/// Makes `AuthSession` usable as a handler argument on any protected route.
/// The access gate middleware already turned away anonymous requests for
/// gated paths; this extractor re-resolves the cookie so handlers get the
/// member identity and so a handler can never run without a live session
/// even if the routing table drifts.
///
/// Rejection: a redirect to the login page, matching the gate's behavior.
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    SessionLifecycle: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionLifecycle::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .ok_or_else(|| Redirect::to("/"))?;

        let member_id = sessions
            .resolve(&token)
            .await
            .ok_or_else(|| Redirect::to("/"))?;

        Ok(AuthSession { member_id })
    }
}
