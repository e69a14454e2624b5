//! Client-side session state: the single source of truth for "who is
//! logged in".
//!
//! The session is derived from the token store exactly once at startup
//! and afterwards mutated only by login, register, and logout. Every
//! outcome is reported as an [`AuthResult`]; no gateway or storage error
//! escapes this boundary raw.

use tracing::{info, warn};

use crate::api::AuthGateway;
use crate::models::UserProfile;

use super::token::{self, TokenStore};

/// Uniform outcome of login/register/logout.
///
/// Never partially populated: success carries the user (for login and
/// register) and no error; failure carries an error and no user.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub success: bool,
    pub user: Option<UserProfile>,
    pub error: Option<String>,
}

impl AuthResult {
    fn succeeded(user: UserProfile) -> Self {
        Self {
            success: true,
            user: Some(user),
            error: None,
        }
    }

    /// Success without a user payload (logout).
    fn completed() -> Self {
        Self {
            success: true,
            user: None,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(error.into()),
        }
    }
}

/// Session state machine: Loading → Authenticated | Unauthenticated.
///
/// Loading is entered once, at construction, and left when
/// [`Session::initialize`] finishes; it is never re-entered. The
/// `user`/`is_authenticated` pair always changes together.
pub struct Session<G> {
    gateway: G,
    store: TokenStore,
    user: Option<UserProfile>,
    is_authenticated: bool,
    is_loading: bool,
}

impl<G: AuthGateway> Session<G> {
    pub fn new(gateway: G, store: TokenStore) -> Self {
        Self {
            gateway,
            store,
            user: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    /// Resolve the stored token into session state. Runs exactly once,
    /// before the first frame of gated content; there is no background
    /// re-checking afterwards.
    ///
    /// An expired or undecodable stored token is evicted so the next
    /// startup does not re-examine a credential that can never work.
    pub fn initialize(&mut self) {
        if let Some(stored) = self.store.get() {
            if token::is_expired(&stored) {
                info!("Stored token is expired or unusable, removing");
                self.store.remove();
            } else {
                match Self::profile_from_token(&stored) {
                    Some(user) => {
                        info!(user_id = user.id, "Session restored from stored token");
                        self.user = Some(user);
                        self.is_authenticated = true;
                    }
                    None => {
                        warn!("Stored token decoded without a usable identity, removing");
                        self.store.remove();
                    }
                }
            }
        }
        self.is_loading = false;
    }

    /// Build the signed-in identity from a token's claims.
    ///
    /// `sub` is required; the display claims degrade to empty strings
    /// when absent, matching what the backend omits for older tokens.
    fn profile_from_token(stored: &str) -> Option<UserProfile> {
        let claims = token::decode_claims(stored)?;
        let id = claims.sub?;
        Some(UserProfile {
            id,
            name: claims.name.unwrap_or_default(),
            email: claims.email.unwrap_or_default(),
            role: claims.role.unwrap_or_default(),
        })
    }

    /// Exchange credentials for a session.
    ///
    /// The session only becomes authenticated once the token is safely
    /// persisted; a token held in memory but not in the store would
    /// silently vanish on restart, so persistence failure fails the
    /// whole login.
    pub async fn login(&mut self, email: &str, password: &str) -> AuthResult {
        match self.gateway.login_user(email, password).await {
            Ok(exchange) => self.establish(exchange),
            Err(e) => {
                warn!(error = %e, "Login rejected");
                AuthResult::failed(e.user_message())
            }
        }
    }

    /// Create an account and sign in. Same contract as [`Session::login`].
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> AuthResult {
        match self.gateway.register_user(name, email, password).await {
            Ok(exchange) => self.establish(exchange),
            Err(e) => {
                warn!(error = %e, "Registration rejected");
                AuthResult::failed(e.user_message())
            }
        }
    }

    fn establish(&mut self, exchange: crate::api::AuthExchange) -> AuthResult {
        if !self.store.set(&exchange.token) {
            warn!("Token persistence failed, refusing to establish session");
            return AuthResult::failed(
                "Signed in, but the session could not be saved on this device. Please try again.",
            );
        }
        info!(user_id = exchange.user.id, "Session established");
        self.user = Some(exchange.user.clone());
        self.is_authenticated = true;
        AuthResult::succeeded(exchange.user)
    }

    /// Tear down the session. The remote notification is best-effort;
    /// local cleanup always happens and the result is always success:
    /// this browser-side of the contract is that the client forgets its
    /// session even when the server is unreachable.
    pub async fn logout(&mut self) -> AuthResult {
        self.gateway.logout_user().await;
        if !self.store.remove() {
            warn!("Failed to remove stored token during logout");
        }
        self.user = None;
        self.is_authenticated = false;
        info!("Session cleared");
        AuthResult::completed()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The persisted token, for attaching to authenticated resource calls.
    pub fn current_token(&self) -> Option<String> {
        self.store.get()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, AuthExchange};
    use async_trait::async_trait;
    use base64::{engine::general_purpose, Engine as _};
    use chrono::Utc;

    /// Scripted gateway standing in for the backend.
    enum MockOutcome {
        Accept(AuthExchange),
        Reject(String),
        Timeout,
    }

    struct MockGateway {
        outcome: MockOutcome,
    }

    #[async_trait]
    impl AuthGateway for MockGateway {
        async fn login_user(&self, _email: &str, _password: &str) -> Result<AuthExchange, ApiError> {
            self.respond()
        }

        async fn register_user(
            &self,
            _name: &str,
            _email: &str,
            _password: &str,
        ) -> Result<AuthExchange, ApiError> {
            self.respond()
        }

        async fn logout_user(&self) {}
    }

    impl MockGateway {
        fn accepting(exchange: AuthExchange) -> Self {
            Self {
                outcome: MockOutcome::Accept(exchange),
            }
        }

        fn rejecting(message: &str) -> Self {
            Self {
                outcome: MockOutcome::Reject(message.to_string()),
            }
        }

        fn respond(&self) -> Result<AuthExchange, ApiError> {
            match &self.outcome {
                MockOutcome::Accept(exchange) => Ok(exchange.clone()),
                MockOutcome::Reject(message) => Err(ApiError::Rejected(message.clone())),
                MockOutcome::Timeout => Err(ApiError::Timeout),
            }
        }
    }

    fn make_token(payload: &str) -> String {
        let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("{}.{}.sig", header, body)
    }

    fn asha() -> UserProfile {
        UserProfile {
            id: 1,
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role: "user".to_string(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::new(dir.path().to_path_buf())
    }

    #[test]
    fn test_fresh_state_initializes_unauthenticated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = Session::new(MockGateway::rejecting("unused"), store_in(&dir));

        assert!(session.is_loading());
        session.initialize();

        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_expired_stored_token_is_removed_on_init() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let expired = make_token(&format!(
            r#"{{"sub":1,"name":"Asha","exp":{}}}"#,
            Utc::now().timestamp() - 1
        ));
        assert!(store.set(&expired));

        let mut session = Session::new(MockGateway::rejecting("unused"), store);
        session.initialize();

        assert!(!session.is_authenticated());
        assert!(session.current_token().is_none(), "expired token should be evicted");
    }

    #[test]
    fn test_valid_stored_token_restores_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        let live = make_token(&format!(
            r#"{{"sub":7,"name":"Ravi","email":"ravi@example.com","role":"admin","exp":{}}}"#,
            Utc::now().timestamp() + 3600
        ));
        assert!(store.set(&live));

        let mut session = Session::new(MockGateway::rejecting("unused"), store);
        session.initialize();

        assert!(session.is_authenticated());
        let user = session.user().expect("user should be restored");
        assert_eq!(user.id, 7);
        assert_eq!(user.name, "Ravi");
        assert_eq!(user.email, "ravi@example.com");
        assert_eq!(user.role, "admin");
    }

    #[test]
    fn test_token_without_identity_is_evicted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(&dir);
        // Live exp but no sub claim: decodes, yet carries no identity.
        let live = make_token(&format!(
            r#"{{"name":"Nobody","exp":{}}}"#,
            Utc::now().timestamp() + 3600
        ));
        assert!(store.set(&live));

        let mut session = Session::new(MockGateway::rejecting("unused"), store);
        session.initialize();

        assert!(!session.is_authenticated());
        assert!(session.current_token().is_none());
    }

    #[tokio::test]
    async fn test_login_success_persists_token_and_authenticates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = MockGateway::accepting(AuthExchange {
            token: "T".to_string(),
            user: asha(),
        });
        let mut session = Session::new(gateway, store_in(&dir));
        session.initialize();

        let result = session.login("a@b.com", "secret1").await;

        assert!(result.success);
        assert_eq!(result.user.as_ref().map(|u| u.id), Some(1));
        assert!(result.error.is_none());
        assert!(session.is_authenticated());
        assert_eq!(session.current_token().as_deref(), Some("T"));
    }

    #[tokio::test]
    async fn test_login_token_claims_match_returned_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let token = make_token(&format!(
            r#"{{"sub":1,"name":"Asha","email":"asha@example.com","role":"user","exp":{}}}"#,
            Utc::now().timestamp() + 3600
        ));
        let gateway = MockGateway::accepting(AuthExchange {
            token,
            user: asha(),
        });
        let mut session = Session::new(gateway, store_in(&dir));
        session.initialize();

        let result = session.login("asha@example.com", "secret1").await;
        let user = result.user.expect("login should return the user");

        let stored = session.current_token().expect("token should be stored");
        let claims = token::decode_claims(&stored).expect("stored token should decode");
        assert_eq!(claims.sub, Some(user.id));
        assert_eq!(claims.name.as_deref(), Some(user.name.as_str()));
        assert_eq!(claims.email.as_deref(), Some(user.email.as_str()));
        assert_eq!(claims.role.as_deref(), Some(user.role.as_str()));
    }

    #[tokio::test]
    async fn test_login_rejection_surfaces_backend_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = Session::new(MockGateway::rejecting("Invalid credentials"), store_in(&dir));
        session.initialize();

        let result = session.login("a@b.com", "wrong").await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid credentials"));
        assert!(result.user.is_none());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.current_token().is_none());
    }

    #[tokio::test]
    async fn test_login_timeout_reads_as_transport_problem() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = MockGateway {
            outcome: MockOutcome::Timeout,
        };
        let mut session = Session::new(gateway, store_in(&dir));
        session.initialize();

        let result = session.login("a@b.com", "secret1").await;

        assert!(!result.success);
        let error = result.error.expect("timeout should carry an error");
        assert_ne!(error, "Invalid credentials");
        assert!(error.to_lowercase().contains("timed out"));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_fails_when_token_cannot_be_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Store rooted at a regular file: every set() fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("write blocker");

        let gateway = MockGateway::accepting(AuthExchange {
            token: "T".to_string(),
            user: asha(),
        });
        let mut session = Session::new(gateway, TokenStore::new(blocker));
        session.initialize();

        let result = session.login("a@b.com", "secret1").await;

        assert!(!result.success);
        assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_register_success_matches_login_contract() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = MockGateway::accepting(AuthExchange {
            token: "R".to_string(),
            user: asha(),
        });
        let mut session = Session::new(gateway, store_in(&dir));
        session.initialize();

        let result = session.register("Asha", "asha@example.com", "secret1").await;

        assert!(result.success);
        assert!(result.user.is_some());
        assert!(session.is_authenticated());
        assert_eq!(session.current_token().as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = MockGateway::accepting(AuthExchange {
            token: "T".to_string(),
            user: asha(),
        });
        let mut session = Session::new(gateway, store_in(&dir));
        session.initialize();
        session.login("a@b.com", "secret1").await;
        assert!(session.is_authenticated());

        let first = session.logout().await;
        let second = session.logout().await;

        assert!(first.success);
        assert!(second.success);
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
        assert!(session.current_token().is_none());
    }
}
