use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use subtle::ConstantTimeEq;

use crate::main_lib::AppState;

pub const CHALLENGE_BODY: &str = "Authentication required";
const DEFAULT_CHALLENGE: &str = "Basic realm=\"Protected Area\"";

/// Checks a username/password pair presented through HTTP Basic.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// The single administrative credential shared by every operator.
pub struct SharedCredential {
    username: String,
    password: String,
}

impl SharedCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialVerifier for SharedCredential {
    fn verify(&self, username: &str, password: &str) -> bool {
        // Both halves are compared so timing does not reveal which one failed.
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

impl fmt::Debug for SharedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    Denied,
}

/// Puts a credential check in front of configured path prefixes.
///
/// Prefixes match whole path segments: `/admin` covers `/admin` and
/// `/admin/settings` but not `/administrator`. Paths outside every prefix are
/// allowed without looking at the request.
pub struct AccessGate {
    protected_prefixes: Vec<String>,
    verifier: Arc<dyn CredentialVerifier>,
    realm: String,
}

impl AccessGate {
    pub fn new(
        protected_prefixes: Vec<String>,
        verifier: Arc<dyn CredentialVerifier>,
        realm: impl Into<String>,
    ) -> Self {
        let protected_prefixes = protected_prefixes
            .iter()
            .map(|prefix| normalize_prefix(prefix))
            .collect();
        Self {
            protected_prefixes,
            verifier,
            realm: realm.into(),
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path_has_prefix(path, prefix))
    }

    pub fn authorize(&self, authorization: Option<&str>, path: &str) -> AccessDecision {
        if !self.is_protected(path) {
            return AccessDecision::Allowed;
        }
        let Some((username, password)) = authorization.and_then(parse_basic_credentials) else {
            return AccessDecision::Denied;
        };
        if self.verifier.verify(&username, &password) {
            AccessDecision::Allowed
        } else {
            AccessDecision::Denied
        }
    }

    fn challenge_header(&self) -> HeaderValue {
        let escaped = self.realm.replace('\\', "\\\\").replace('"', "\\\"");
        HeaderValue::from_str(&format!("Basic realm=\"{escaped}\""))
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CHALLENGE))
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with('/') || trimmed.is_empty() {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// An empty prefix (configured as `/`) covers every path.
fn path_has_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Decodes `Basic base64(user:pass)`. The password may itself contain `:`.
fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let mut parts = header.trim().splitn(2, ' ');
    let (Some(scheme), Some(encoded)) = (parts.next(), parts.next()) else {
        return None;
    };
    if !scheme.eq_ignore_ascii_case("Basic") {
        return None;
    }
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[derive(Debug)]
pub enum AuthError {
    Unauthorized(HeaderValue),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthorized(challenge) => (
                StatusCode::UNAUTHORIZED,
                [(WWW_AUTHENTICATE, challenge)],
                CHALLENGE_BODY,
            )
                .into_response(),
        }
    }
}

pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let gate = &state.access_gate;
    let path = request.uri().path();
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match gate.authorize(authorization, path) {
        AccessDecision::Allowed => Ok(next.run(request).await),
        AccessDecision::Denied => {
            tracing::debug!("Denied unauthenticated request to {}", path);
            Err(AuthError::Unauthorized(gate.challenge_header()))
        }
    }
}
