//! HTTP client for the DiviMate backend.
//!
//! `ApiClient` covers both roles the backend plays: the credential
//! exchange (login/register, via the [`AuthGateway`] trait) and the
//! authenticated resource endpoints (users, groups, expenses,
//! settlement summaries). All business computation happens server-side;
//! this client only ships JSON back and forth.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::models::{Group, GroupSummary, User, UserProfile};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// Bounded so a dead backend settles to a failure instead of hanging the UI.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Successful credential exchange: the bearer token to persist plus the
/// profile the backend attached to it.
#[derive(Debug, Clone)]
pub struct AuthExchange {
    pub token: String,
    pub user: UserProfile,
}

/// The only seam through which credentials cross the network.
///
/// Session state is generic over this trait so tests can drive the
/// login/register/logout flows without a live backend.
#[async_trait]
pub trait AuthGateway {
    async fn login_user(&self, email: &str, password: &str) -> Result<AuthExchange, ApiError>;

    async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthExchange, ApiError>;

    /// Best-effort logout notification. The backend has no logout
    /// endpoint, so this must never fail the caller.
    async fn logout_user(&self);
}

#[derive(Debug, serde::Deserialize)]
struct AuthResponse {
    token: String,
    user: UserProfile,
}

/// API client for the DiviMate backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Set the bearer token attached to authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Drop the bearer token (after logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if response is successful, classifying the body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.apply_auth(self.client.get(&url)).send().await?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self
            .apply_auth(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url, e)))
    }

    /// POST where only the status matters; the response body is ignored.
    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        let url = self.url(path);
        let response = self
            .apply_auth(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn delete_unit(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        let response = self.apply_auth(self.client.delete(&url)).send().await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ===== Resource endpoints =====

    /// Fetch the full user directory (for member pickers)
    pub async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/api/users").await
    }

    /// Fetch the groups the given user belongs to
    pub async fn fetch_groups(&self, user_id: i64) -> Result<Vec<Group>, ApiError> {
        self.get_json(&format!("/api/groups?userId={}", user_id))
            .await
    }

    /// Fetch the backend-computed balance sheet for a group
    pub async fn fetch_group_summary(&self, group_id: i64) -> Result<GroupSummary, ApiError> {
        self.get_json(&format!("/api/groups/{}/summary", group_id))
            .await
    }

    /// Create a group with the given member user ids
    pub async fn create_group(&self, name: &str, user_ids: &[i64]) -> Result<(), ApiError> {
        self.post_unit(
            "/api/groups",
            &serde_json::json!({ "name": name, "userIds": user_ids }),
        )
        .await
    }

    /// Record a shared expense in a group
    pub async fn add_expense(
        &self,
        group_id: i64,
        description: &str,
        amount: f64,
        paid_by_id: i64,
    ) -> Result<(), ApiError> {
        self.post_unit(
            &format!("/api/groups/{}/expenses", group_id),
            &serde_json::json!({
                "description": description,
                "amount": amount,
                "paidById": paid_by_id,
            }),
        )
        .await
    }

    /// Add an existing user to a group
    pub async fn add_member(&self, group_id: i64, user_id: i64) -> Result<(), ApiError> {
        self.post_unit(
            &format!("/api/groups/{}/members", group_id),
            &serde_json::json!({ "userId": user_id }),
        )
        .await
    }

    /// Remove a member from a group
    pub async fn remove_member(&self, group_id: i64, user_id: i64) -> Result<(), ApiError> {
        self.delete_unit(&format!("/api/groups/{}/members/{}", group_id, user_id))
            .await
    }
}

#[async_trait]
impl AuthGateway for ApiClient {
    async fn login_user(&self, email: &str, password: &str) -> Result<AuthExchange, ApiError> {
        let response: AuthResponse = self
            .post_json(
                "/api/users/login",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        Ok(AuthExchange {
            token: response.token,
            user: response.user,
        })
    }

    async fn register_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthExchange, ApiError> {
        let response: AuthResponse = self
            .post_json(
                "/api/users",
                &serde_json::json!({ "name": name, "email": email, "password": password }),
            )
            .await?;
        Ok(AuthExchange {
            token: response.token,
            user: response.user,
        })
    }

    async fn logout_user(&self) {
        // No backend endpoint exists; logout is a client-side guarantee.
        debug!("Logout is local-only, no backend call issued");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{
            "token": "h.p.s",
            "user": {"id": 1, "name": "Asha", "email": "asha@example.com", "role": "user"}
        }"#;
        let resp: AuthResponse = serde_json::from_str(json)
            .expect("Failed to parse auth response test JSON");
        assert_eq!(resp.token, "h.p.s");
        assert_eq!(resp.user.id, 1);
        assert_eq!(resp.user.role, "user");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:4000/").expect("client");
        assert_eq!(
            client.url("/api/users/login"),
            "http://localhost:4000/api/users/login"
        );
    }
}
